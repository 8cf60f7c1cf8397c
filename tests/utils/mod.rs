pub mod client;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use setup::{start_server, TestServer};
