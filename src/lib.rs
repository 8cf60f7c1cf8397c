// Library crate for the collaboration room server
// This file exposes the public API for integration tests

pub mod config;
pub mod health;
pub mod room;
pub mod session;
pub mod shared;
pub mod websockets;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use config::ServerConfig;
pub use room::{ClientId, RoomId, RoomStore};
pub use session::{Coordinator, CoordinatorHandle, SessionHandler};
pub use shared::{AppError, AppState};
pub use websockets::{ClientMessage, ConnectionRegistry, ServerMessage};

/// Builds the HTTP router: health check on `/`, realtime channel on `/ws`
pub fn app(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health))
        .route("/ws", get(websockets::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
