//! Test server setup - a real listener on an ephemeral port
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::net::SocketAddr;
use tokio::{net::TcpListener, task::JoinHandle};

use collab_room::{app, AppState, Coordinator};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestServer {
    pub addr: SocketAddr,
    _server: JoinHandle<()>,
    _coordinator: JoinHandle<()>,
}

impl TestServer {
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self._server.abort();
    }
}

pub async fn start_server() -> TestServer {
    let (coordinator, coordinator_task) = Coordinator::spawn();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        axum::serve(listener, app(AppState::new(coordinator)))
            .await
            .unwrap();
    });

    TestServer {
        addr,
        _server: server,
        _coordinator: coordinator_task,
    }
}
