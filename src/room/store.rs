use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::types::{ClientId, RoomId};

/// Result of adding a client to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRoomResult {
    /// Client was added; `first_member` is true if the room was created by this join
    Joined { first_member: bool },
    /// Client was already a member, nothing changed
    AlreadyMember,
}

/// Result of removing a client from a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveRoomResult {
    /// Client was removed and the room still has members
    Left { remaining: usize },
    /// Client was the last member, the room entry was deleted
    RoomDeleted,
    /// Client was not a member (or the room does not exist)
    NotMember,
}

/// Authoritative room -> members table.
///
/// A room exists only while it has at least one member. The store does no
/// locking of its own; it is owned by the session run loop.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomId, HashSet<ClientId>>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, room_id: &RoomId, client_id: &ClientId) -> JoinRoomResult {
        let members = self.rooms.entry(room_id.clone()).or_default();

        if !members.insert(client_id.clone()) {
            debug!(room_id = %room_id, client_id = %client_id, "Client already in room");
            return JoinRoomResult::AlreadyMember;
        }

        debug!(
            room_id = %room_id,
            client_id = %client_id,
            member_count = members.len(),
            "Client joined room"
        );

        JoinRoomResult::Joined {
            first_member: members.len() == 1,
        }
    }

    pub fn leave(&mut self, room_id: &RoomId, client_id: &ClientId) -> LeaveRoomResult {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return LeaveRoomResult::NotMember;
        };

        if !members.remove(client_id) {
            return LeaveRoomResult::NotMember;
        }

        if members.is_empty() {
            debug!(room_id = %room_id, "Room is now empty, deleting");
            self.rooms.remove(room_id);
            return LeaveRoomResult::RoomDeleted;
        }

        LeaveRoomResult::Left {
            remaining: members.len(),
        }
    }

    /// Snapshot of the room's members. Order carries no meaning.
    pub fn members_of(&self, room_id: &RoomId) -> Vec<ClientId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every room the client currently belongs to. Linear in the number of rooms.
    pub fn rooms_of(&self, client_id: &ClientId) -> HashSet<RoomId> {
        self.rooms
            .iter()
            .filter(|(_, members)| members.contains(client_id))
            .map(|(room_id, _)| room_id.clone())
            .collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
