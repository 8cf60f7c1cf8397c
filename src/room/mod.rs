// Public API - what other modules can use
pub use store::{JoinRoomResult, LeaveRoomResult, RoomStore};
pub use types::{ClientId, RoomId};

// Internal modules
pub mod store;
pub mod types;
