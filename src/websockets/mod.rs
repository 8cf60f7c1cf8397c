// Public API
pub use connection_registry::{ConnectionRegistry, ConnectionState, RegisterError};
pub use handler::{websocket_handler, WebsocketReceiveHandler, CLIENT_ID_HEADER};
pub use messages::{ClientMessage, RelayPayload, ServerMessage};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

// Internal modules
pub mod connection_registry;
mod handler;
pub mod messages;
mod socket;
