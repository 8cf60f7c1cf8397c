use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::messages::ServerMessage;
use crate::room::{ClientId, RoomId};

/// Lifecycle of one connection as seen by the session layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Registered, member of no room
    Connected,
    /// Member of at least one room
    Joined,
    /// Unregistered or never known. Terminal.
    Closed,
}

#[derive(Debug, Error, PartialEq)]
pub enum RegisterError {
    #[error("Client id already registered: {0}")]
    ClientIdInUse(ClientId),
}

struct ConnectionEntry {
    sender: mpsc::UnboundedSender<ServerMessage>,
    rooms: HashSet<RoomId>,
}

/// Tracks every live connection and the rooms it belongs to.
///
/// Each connection is represented by the sending half of its outbound queue;
/// the socket task owns the receiving half.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ClientId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection under an id allocated at upgrade time.
    /// Fails if a live connection already holds that id.
    pub fn register(
        &mut self,
        client_id: ClientId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<(), RegisterError> {
        if self.connections.contains_key(&client_id) {
            return Err(RegisterError::ClientIdInUse(client_id));
        }

        self.connections.insert(
            client_id.clone(),
            ConnectionEntry {
                sender,
                rooms: HashSet::new(),
            },
        );

        debug!(client_id = %client_id, live = self.connections.len(), "Connection registered");
        Ok(())
    }

    /// Registers under a freshly generated id
    #[cfg(test)]
    pub(crate) fn register_new(&mut self, sender: mpsc::UnboundedSender<ServerMessage>) -> ClientId {
        let client_id = ClientId::generate();
        self.register(client_id.clone(), sender)
            .expect("generated id collided");
        client_id
    }

    /// Removes the connection and hands back the rooms it was in.
    /// A second call for the same id returns an empty set.
    pub fn unregister(&mut self, client_id: &ClientId) -> HashSet<RoomId> {
        match self.connections.remove(client_id) {
            Some(entry) => {
                debug!(
                    client_id = %client_id,
                    rooms = entry.rooms.len(),
                    live = self.connections.len(),
                    "Connection unregistered"
                );
                entry.rooms
            }
            None => HashSet::new(),
        }
    }

    /// Best-effort delivery. Unknown ids and closed queues are ignored.
    pub fn send(&self, client_id: &ClientId, message: ServerMessage) {
        let Some(entry) = self.connections.get(client_id) else {
            trace!(client_id = %client_id, event = message.event_name(), "Dropping message for unknown connection");
            return;
        };

        let event = message.event_name();
        if entry.sender.send(message).is_err() {
            trace!(client_id = %client_id, event, "Outbound queue closed, message dropped");
        }
    }

    pub fn record_join(&mut self, client_id: &ClientId, room_id: &RoomId) {
        if let Some(entry) = self.connections.get_mut(client_id) {
            entry.rooms.insert(room_id.clone());
        }
    }

    pub fn record_leave(&mut self, client_id: &ClientId, room_id: &RoomId) {
        if let Some(entry) = self.connections.get_mut(client_id) {
            entry.rooms.remove(room_id);
        }
    }

    pub fn rooms_of(&self, client_id: &ClientId) -> HashSet<RoomId> {
        self.connections
            .get(client_id)
            .map(|entry| entry.rooms.clone())
            .unwrap_or_default()
    }

    pub fn state(&self, client_id: &ClientId) -> ConnectionState {
        match self.connections.get(client_id) {
            None => ConnectionState::Closed,
            Some(entry) if entry.rooms.is_empty() => ConnectionState::Connected,
            Some(_) => ConnectionState::Joined,
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str) -> RoomId {
        RoomId::parse(name).unwrap()
    }

    #[test]
    fn test_register_rejects_id_held_by_live_connection() {
        let mut registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        let id = ClientId::from("taken");

        registry.register(id.clone(), tx_a).unwrap();
        let result = registry.register(id.clone(), tx_b);

        assert_eq!(result, Err(RegisterError::ClientIdInUse(id.clone())));
        assert_eq!(registry.connection_count(), 1);
        // The original owner keeps the id
        registry.send(&id, ServerMessage::InitRoom);
        assert_eq!(rx_a.try_recv().unwrap(), ServerMessage::InitRoom);
    }

    #[test]
    fn test_id_can_be_registered_again_after_release() {
        let mut registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = ClientId::from("reused");

        registry.register(id.clone(), tx.clone()).unwrap();
        registry.unregister(&id);

        assert!(registry.register(id.clone(), tx).is_ok());
        assert_eq!(registry.state(&id), ConnectionState::Connected);
    }

    #[test]
    fn test_send_delivers_to_one_connection() {
        let mut registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = registry.register_new(tx_a);
        let _b = registry.register_new(tx_b);

        registry.send(&a, ServerMessage::InitRoom);

        assert_eq!(rx_a.try_recv().unwrap(), ServerMessage::InitRoom);
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_send_to_unknown_or_closed_connection_is_noop() {
        let mut registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = registry.register_new(tx);
        drop(rx);

        registry.send(&id, ServerMessage::InitRoom);
        registry.send(&ClientId::from("ghost"), ServerMessage::InitRoom);
    }

    #[test]
    fn test_unregister_returns_rooms_once() {
        let mut registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register_new(tx);
        registry.record_join(&id, &room("lobby"));
        registry.record_join(&id, &room("kitchen"));

        let rooms = registry.unregister(&id);
        assert_eq!(rooms.len(), 2);
        assert!(rooms.contains(&room("lobby")));

        assert!(registry.unregister(&id).is_empty());
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn test_state_transitions() {
        let mut registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register_new(tx);
        assert_eq!(registry.state(&id), ConnectionState::Connected);

        registry.record_join(&id, &room("lobby"));
        assert_eq!(registry.state(&id), ConnectionState::Joined);

        registry.record_leave(&id, &room("lobby"));
        assert_eq!(registry.state(&id), ConnectionState::Connected);

        registry.unregister(&id);
        assert_eq!(registry.state(&id), ConnectionState::Closed);

        // Closed is terminal
        registry.record_join(&id, &room("lobby"));
        assert_eq!(registry.state(&id), ConnectionState::Closed);
    }
}
