use tracing::trace;

use crate::{
    room::{ClientId, RoomId, RoomStore},
    websockets::{connection_registry::ConnectionRegistry, messages::ServerMessage},
};

/// Forwards opaque collaboration payloads between room members.
/// Never touches membership.
pub struct RelayGateway;

impl RelayGateway {
    /// Sends `message` to every member of the room except `origin`
    pub fn forward(
        registry: &ConnectionRegistry,
        store: &RoomStore,
        room_id: &RoomId,
        origin: &ClientId,
        message: ServerMessage,
    ) {
        let mut forwarded = 0;
        for member in store.members_of(room_id) {
            if &member == origin {
                continue;
            }
            registry.send(&member, message.clone());
            forwarded += 1;
        }

        trace!(
            room_id = %room_id,
            origin = %origin,
            event = message.event_name(),
            forwarded,
            "Relayed payload"
        );
    }
}
