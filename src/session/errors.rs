use thiserror::Error;

use crate::websockets::connection_registry::RegisterError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session coordinator is not running")]
    CoordinatorClosed,

    #[error("Connection was dropped before registration completed")]
    RegistrationDropped,

    #[error(transparent)]
    Register(#[from] RegisterError),
}
