//! WebSocket test client speaking the JSON event protocol
#![allow(dead_code)] // Test utilities may not all be used in every test

use futures::{SinkExt, StreamExt};
use std::collections::HashSet;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use collab_room::{websockets::CLIENT_ID_HEADER, ClientId, ClientMessage, ServerMessage};

use super::setup::TestServer;

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct TestClient {
    /// Id announced by the server in the handshake response
    pub id: ClientId,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, response) = connect_async(server.ws_url()).await.unwrap();
        let id = response
            .headers()
            .get(CLIENT_ID_HEADER)
            .expect("handshake response carries the client id")
            .to_str()
            .unwrap();
        Self {
            id: ClientId::from(id),
            stream,
        }
    }

    /// Connects and consumes the mandatory init-room event
    pub async fn connect_and_expect_init(server: &TestServer) -> Self {
        let mut client = Self::connect(server).await;
        assert_eq!(client.next_message().await, ServerMessage::InitRoom);
        client
    }

    pub async fn send(&mut self, message: &ClientMessage) {
        let text = serde_json::to_string(message).unwrap();
        self.send_raw(&text).await;
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::Text(text.to_string()))
            .await
            .unwrap();
    }

    pub async fn join(&mut self, room: &str) {
        self.send(&ClientMessage::JoinRoom(room.to_string())).await;
    }

    /// Next server event, skipping control frames
    pub async fn next_message(&mut self) -> ServerMessage {
        loop {
            let frame = timeout(RECEIVE_TIMEOUT, self.stream.next())
                .await
                .expect("timed out waiting for server message");
            match frame {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(Message::Close(_))) | None => panic!("connection closed by server"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("websocket error: {e}"),
            }
        }
    }

    /// Skips other events until the next room-user-change
    pub async fn next_user_list(&mut self) -> HashSet<ClientId> {
        loop {
            if let ServerMessage::RoomUserChange(members) = self.next_message().await {
                let unique: HashSet<ClientId> = members.iter().cloned().collect();
                assert_eq!(unique.len(), members.len(), "duplicate ids in member list");
                return unique;
            }
        }
    }

    /// Asserts nothing arrives within `window`
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(Some(Ok(Message::Text(text)))) = timeout(window, self.stream.next()).await {
            panic!("expected no message, got {text}");
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }

    /// Closes and waits until the server has ended the connection on its side
    pub async fn close_and_wait(mut self) {
        let _ = self.stream.close(None).await;
        timeout(RECEIVE_TIMEOUT, async {
            while let Some(Ok(_)) = self.stream.next().await {}
        })
        .await
        .expect("timed out waiting for server to close the connection");
    }
}
