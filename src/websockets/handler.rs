use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::HeaderValue,
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::room::ClientId;
use crate::session::CoordinatorHandle;
use crate::shared::{AppError, AppState};
use crate::websockets::messages::{ClientMessage, ServerMessage};

use super::socket::{Connection, MessageHandler};

/// Handshake response header carrying the id the connection is registered under
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Parses client frames and forwards them to the session coordinator.
///
/// A frame that does not parse is dropped here and never reaches shared state.
pub struct WebsocketReceiveHandler {
    coordinator: CoordinatorHandle,
}

impl WebsocketReceiveHandler {
    pub fn new(coordinator: CoordinatorHandle) -> Self {
        Self { coordinator }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, client_id: &ClientId, message: String) {
        debug!(client_id = %client_id, message = %message, "Received message");

        match serde_json::from_str::<ClientMessage>(&message) {
            Ok(client_message) => {
                if let Err(e) = self
                    .coordinator
                    .dispatch(client_id.clone(), client_message)
                {
                    warn!(client_id = %client_id, error = %e, "Failed to dispatch message");
                }
            }
            Err(e) => {
                warn!(
                    client_id = %client_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
            }
        }
    }
}

/// GET /ws - upgrades to the realtime presence channel
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    if app_state.coordinator.is_closed() {
        warn!("Rejecting WebSocket connection, session coordinator is down");
        return Err(AppError::ServiceUnavailable);
    }

    // The id is fixed before the handshake completes so the client can read it
    let client_id = ClientId::generate();
    debug!(client_id = %client_id, "WebSocket connection requested");

    let header_value = HeaderValue::from_str(client_id.as_str());
    let upgrade_id = client_id.clone();
    let mut response =
        ws.on_upgrade(move |socket| handle_websocket_connection(socket, upgrade_id, app_state));

    match header_value {
        Ok(value) => {
            response.headers_mut().insert(CLIENT_ID_HEADER, value);
        }
        Err(e) => warn!(client_id = %client_id, error = %e, "Client id is not a valid header value"),
    }
    Ok(response)
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    client_id: ClientId,
    app_state: AppState,
) {
    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<ServerMessage>();

    if let Err(e) = app_state
        .coordinator
        .connect(client_id.clone(), outbound_sender)
        .await
    {
        warn!(client_id = %client_id, error = %e, "Failed to register connection");
        return;
    }

    info!(client_id = %client_id, "WebSocket connection established");

    let message_handler = Arc::new(WebsocketReceiveHandler::new(app_state.coordinator.clone()));
    let mut connection = Connection::new(
        client_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(client_id = %client_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(client_id = %client_id, error = %e, "WebSocket connection error");
        }
    }

    // Both paths converge on the same cleanup. The disconnect is queued
    // before the socket is released, so a client that saw its stream end
    // can rely on the server having scheduled its removal.
    if let Err(e) = app_state.coordinator.disconnect(client_id.clone()) {
        warn!(client_id = %client_id, error = %e, "Failed to emit disconnect");
    }
    drop(connection);
}
