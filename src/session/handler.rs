use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{
    broadcaster::PresenceBroadcaster, errors::SessionError, events::SessionEvent,
    relay::RelayGateway,
};
use crate::{
    room::{ClientId, JoinRoomResult, LeaveRoomResult, RoomId, RoomStore},
    websockets::{
        connection_registry::{ConnectionRegistry, ConnectionState},
        messages::{ClientMessage, RelayPayload, ServerMessage},
    },
};

/// Per-connection session state machine.
///
/// Owns the connection registry and the room store. Every method runs to
/// completion before the next event is handled, so a mutation, the snapshot
/// read after it and the broadcast of that snapshot form one unit.
#[derive(Default)]
pub struct SessionHandler {
    registry: ConnectionRegistry,
    rooms: RoomStore,
}

impl SessionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connect {
                client_id,
                sender,
                reply,
            } => {
                let result = self.on_connect(&client_id, sender);
                let registered = result.is_ok();
                if reply.send(result).is_err() && registered {
                    // Socket task went away before registration completed
                    warn!(client_id = %client_id, "Connect requester dropped, unregistering");
                    self.on_disconnect(&client_id);
                }
            }
            SessionEvent::Message { client_id, message } => self.on_message(&client_id, message),
            SessionEvent::Disconnect { client_id } => self.on_disconnect(&client_id),
        }
    }

    pub fn on_connect(
        &mut self,
        client_id: &ClientId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<(), SessionError> {
        if let Err(e) = self.registry.register(client_id.clone(), sender) {
            warn!(client_id = %client_id, error = %e, "Connection rejected");
            return Err(e.into());
        }
        self.registry.send(client_id, ServerMessage::InitRoom);

        info!(client_id = %client_id, "Client connected");
        Ok(())
    }

    pub fn on_message(&mut self, client_id: &ClientId, message: ClientMessage) {
        if self.registry.state(client_id) == ConnectionState::Closed {
            debug!(client_id = %client_id, "Ignoring message from closed connection");
            return;
        }

        match message {
            ClientMessage::JoinRoom(room) => self.on_join_room(client_id, &room),
            ClientMessage::LeaveRoom(room) => self.on_leave_room(client_id, &room),
            ClientMessage::ServerBroadcast(payload) => self.on_relay(client_id, payload, false),
            ClientMessage::ServerVolatileBroadcast(payload) => {
                self.on_relay(client_id, payload, true)
            }
        }
    }

    pub fn on_join_room(&mut self, client_id: &ClientId, raw_room: &str) {
        let Some(room_id) = RoomId::parse(raw_room) else {
            debug!(client_id = %client_id, "Ignoring join with empty room id");
            return;
        };
        if self.registry.state(client_id) == ConnectionState::Closed {
            return;
        }

        match self.rooms.join(&room_id, client_id) {
            JoinRoomResult::AlreadyMember => {
                debug!(room_id = %room_id, client_id = %client_id, "Duplicate join ignored");
            }
            JoinRoomResult::Joined { first_member } => {
                self.registry.record_join(client_id, &room_id);
                info!(room_id = %room_id, client_id = %client_id, first_member, "Client joined room");

                if first_member {
                    self.registry.send(client_id, ServerMessage::FirstInRoom);
                } else {
                    PresenceBroadcaster::announce_new_member(
                        &self.registry,
                        &self.rooms,
                        &room_id,
                        client_id,
                    );
                }
                PresenceBroadcaster::notify(&self.registry, &self.rooms, &room_id);
            }
        }
    }

    pub fn on_leave_room(&mut self, client_id: &ClientId, raw_room: &str) {
        let Some(room_id) = RoomId::parse(raw_room) else {
            debug!(client_id = %client_id, "Ignoring leave with empty room id");
            return;
        };

        self.registry.record_leave(client_id, &room_id);
        self.leave_and_notify(&room_id, client_id);
    }

    pub fn on_disconnect(&mut self, client_id: &ClientId) {
        let mut rooms = self.registry.unregister(client_id);
        let stored = self.rooms.rooms_of(client_id);
        if stored != rooms {
            warn!(
                client_id = %client_id,
                registry_rooms = rooms.len(),
                store_rooms = stored.len(),
                "Registry and room store disagree on memberships, leaving all of them"
            );
            rooms.extend(stored);
        }

        for room_id in &rooms {
            self.leave_and_notify(room_id, client_id);
        }

        info!(client_id = %client_id, rooms_left = rooms.len(), "Client disconnected");
    }

    fn on_relay(&self, client_id: &ClientId, payload: RelayPayload, volatile: bool) {
        let Some(room_id) = RoomId::parse(&payload.room) else {
            debug!(client_id = %client_id, "Ignoring relay with empty room id");
            return;
        };

        let message = if volatile {
            ServerMessage::ClientVolatileBroadcast(payload.data)
        } else {
            ServerMessage::ClientBroadcast(payload.data)
        };
        RelayGateway::forward(&self.registry, &self.rooms, &room_id, client_id, message);
    }

    fn leave_and_notify(&mut self, room_id: &RoomId, client_id: &ClientId) {
        match self.rooms.leave(room_id, client_id) {
            LeaveRoomResult::Left { remaining } => {
                info!(room_id = %room_id, client_id = %client_id, remaining, "Client left room");
                PresenceBroadcaster::notify(&self.registry, &self.rooms, room_id);
            }
            LeaveRoomResult::RoomDeleted => {
                info!(room_id = %room_id, client_id = %client_id, "Last client left, room deleted");
            }
            LeaveRoomResult::NotMember => {
                debug!(room_id = %room_id, client_id = %client_id, "Leave for non-member ignored");
            }
        }
    }
}
