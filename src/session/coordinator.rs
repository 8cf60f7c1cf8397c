use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{errors::SessionError, events::SessionEvent, handler::SessionHandler};
use crate::room::ClientId;
use crate::websockets::messages::{ClientMessage, ServerMessage};

/// Single run loop that owns all membership state.
///
/// Every connection funnels its events into one mailbox, which gives a total
/// order over all mutations in the process.
pub struct Coordinator {
    handler: SessionHandler,
    inbox: mpsc::UnboundedReceiver<SessionEvent>,
}

/// Cheap, cloneable entry point into the coordinator's mailbox
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::UnboundedSender<SessionEvent>,
}

impl Coordinator {
    pub fn new() -> (Self, CoordinatorHandle) {
        let (sender, inbox) = mpsc::unbounded_channel();
        (
            Self {
                handler: SessionHandler::new(),
                inbox,
            },
            CoordinatorHandle { sender },
        )
    }

    /// Spawns the run loop on the current runtime
    pub fn spawn() -> (CoordinatorHandle, JoinHandle<()>) {
        let (coordinator, handle) = Self::new();
        let task = tokio::spawn(coordinator.run());
        (handle, task)
    }

    /// Processes events until every handle has been dropped
    pub async fn run(mut self) {
        info!("Session coordinator started");

        while let Some(event) = self.inbox.recv().await {
            self.handler.handle(event);
        }

        warn!("Session coordinator stopped - no more handles");
    }
}

impl CoordinatorHandle {
    /// Registers a connection under `client_id`. Resolves once `init-room` is
    /// queued on `sender`, or with an error if the id is already live.
    pub async fn connect(
        &self,
        client_id: ClientId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<(), SessionError> {
        let (reply, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionEvent::Connect {
                client_id,
                sender,
                reply,
            })
            .map_err(|_| SessionError::CoordinatorClosed)?;

        reply_rx
            .await
            .map_err(|_| SessionError::RegistrationDropped)?
    }

    pub fn dispatch(&self, client_id: ClientId, message: ClientMessage) -> Result<(), SessionError> {
        self.sender
            .send(SessionEvent::Message { client_id, message })
            .map_err(|_| SessionError::CoordinatorClosed)
    }

    pub fn disconnect(&self, client_id: ClientId) -> Result<(), SessionError> {
        self.sender
            .send(SessionEvent::Disconnect { client_id })
            .map_err(|_| SessionError::CoordinatorClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
