use serde::{Deserialize, Serialize};

use crate::room::ClientId;

/// Client -> Server messages
///
/// Wire shape is `{"type": "<event>", "payload": <value>}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom(String),
    LeaveRoom(String),
    ServerBroadcast(RelayPayload),
    ServerVolatileBroadcast(RelayPayload),
}

/// Opaque collaboration data addressed to a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayPayload {
    pub room: String,
    pub data: serde_json::Value,
}

/// Server -> Client messages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent once, as the first message on every connection
    InitRoom,
    FirstInRoom,
    NewUser(ClientId),
    RoomUserChange(Vec<ClientId>),
    ClientBroadcast(serde_json::Value),
    ClientVolatileBroadcast(serde_json::Value),
}

impl ServerMessage {
    /// Event name as it appears on the wire, for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::InitRoom => "init-room",
            ServerMessage::FirstInRoom => "first-in-room",
            ServerMessage::NewUser(_) => "new-user",
            ServerMessage::RoomUserChange(_) => "room-user-change",
            ServerMessage::ClientBroadcast(_) => "client-broadcast",
            ServerMessage::ClientVolatileBroadcast(_) => "client-volatile-broadcast",
        }
    }
}
