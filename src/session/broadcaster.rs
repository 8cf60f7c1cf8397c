use tracing::debug;

use crate::{
    room::{ClientId, RoomId, RoomStore},
    websockets::{connection_registry::ConnectionRegistry, messages::ServerMessage},
};

/// Delivers presence updates to the members of a room.
///
/// Callers must invoke these right after the mutation that caused them and
/// before handling the next event, so the snapshot read here is never stale.
pub struct PresenceBroadcaster;

impl PresenceBroadcaster {
    /// Sends the room's current member list to every member, including the
    /// one whose action triggered it.
    pub fn notify(registry: &ConnectionRegistry, store: &RoomStore, room_id: &RoomId) {
        let members = store.members_of(room_id);

        for member in &members {
            registry.send(member, ServerMessage::RoomUserChange(members.clone()));
        }

        debug!(
            room_id = %room_id,
            members_notified = members.len(),
            "Room user change broadcast"
        );
    }

    /// Tells every member except the newcomer that someone joined
    pub fn announce_new_member(
        registry: &ConnectionRegistry,
        store: &RoomStore,
        room_id: &RoomId,
        newcomer: &ClientId,
    ) {
        for member in store.members_of(room_id) {
            if &member != newcomer {
                registry.send(&member, ServerMessage::NewUser(newcomer.clone()));
            }
        }
    }
}
