// Public API
pub use broadcaster::PresenceBroadcaster;
pub use coordinator::{Coordinator, CoordinatorHandle};
pub use errors::SessionError;
pub use events::SessionEvent;
pub use handler::SessionHandler;
pub use relay::RelayGateway;

// Internal modules
mod broadcaster;
mod coordinator;
mod errors;
mod events;
mod handler;
mod relay;
