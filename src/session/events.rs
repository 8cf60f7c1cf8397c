use tokio::sync::{mpsc, oneshot};

use super::errors::SessionError;
use crate::room::ClientId;
use crate::websockets::messages::{ClientMessage, ServerMessage};

/// Inbound events processed by the session run loop, one at a time, in arrival order
#[derive(Debug)]
pub enum SessionEvent {
    /// A transport connection was established under an id allocated at upgrade.
    /// The outcome is sent back on `reply`, after `init-room` when it succeeded.
    Connect {
        client_id: ClientId,
        sender: mpsc::UnboundedSender<ServerMessage>,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },

    /// A parsed message arrived on a live connection
    Message {
        client_id: ClientId,
        message: ClientMessage,
    },

    /// The transport connection ended, gracefully or not
    Disconnect { client_id: ClientId },
}
