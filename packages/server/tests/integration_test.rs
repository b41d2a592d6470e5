//! Integration tests for the relay: a real axum server on an ephemeral port,
//! driven by WebSocket clients.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use nagare_server::{
    config::ServerConfig,
    ui::{Server, state::AppState},
};
use nagare_shared::time::SystemClock;
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message},
};

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(300);

/// Helper struct to manage the in-process server lifecycle
struct TestServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let config = ServerConfig {
            port: addr.port(),
            ..ServerConfig::default()
        };
        let server = Server::new(AppState::in_memory(&config, Arc::new(SystemClock)));
        let task = tokio::spawn(async move {
            let _ = server.serve(listener).await;
        });

        TestServer { addr, task }
    }

    fn ws_url(&self, username: &str) -> String {
        format!("ws://{}/ws?username={}", self.addr, username)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn get_json(&self, path: &str) -> Value {
        reqwest::get(self.http_url(path))
            .await
            .expect("HTTP request failed")
            .json()
            .await
            .expect("Response was not JSON")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Helper struct wrapping one WebSocket client
struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl TestClient {
    /// Connect and wait until the hub has registered the session
    async fn connect(server: &TestServer, username: &str) -> Self {
        let (stream, _) = connect_async(server.ws_url(username))
            .await
            .expect("Failed to connect");
        let mut client = TestClient { stream };
        let joined = format!("{} joined the chat", username);
        client
            .recv_matching(WAIT, |frame| frame["type"] == "system" && frame["content"] == joined)
            .await
            .expect("Did not receive own join notice");
        client
    }

    async fn send(&mut self, frame: Value) {
        self.stream
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("Failed to send frame");
    }

    /// Read frames until one matches, the connection closes, or `wait` elapses
    async fn recv_matching(
        &mut self,
        wait: Duration,
        predicate: impl Fn(&Value) -> bool,
    ) -> Option<Value> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let next = tokio::time::timeout_at(deadline, self.stream.next()).await;
            match next {
                Ok(Some(Ok(Message::Text(text)))) => {
                    let frame: Value = serde_json::from_str(text.as_str()).expect("Invalid JSON");
                    if predicate(&frame) {
                        return Some(frame);
                    }
                }
                Ok(Some(Ok(Message::Close(_)))) | Ok(Some(Err(_))) | Ok(None) => return None,
                Ok(Some(Ok(_))) => {}
                Err(_) => return None,
            }
        }
    }

    async fn recv_type(&mut self, kind: &str) -> Value {
        self.recv_matching(WAIT, |frame| frame["type"] == kind)
            .await
            .unwrap_or_else(|| panic!("Did not receive a '{}' frame", kind))
    }

    /// True once the server has closed this connection
    async fn is_closed_by_server(&mut self) -> bool {
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            match tokio::time::timeout_at(deadline, self.stream.next()).await {
                Ok(Some(Ok(Message::Close(_)))) | Ok(None) | Ok(Some(Err(_))) => return true,
                Ok(Some(Ok(_))) => {}
                Err(_) => return false,
            }
        }
    }
}

fn group_ids(frame: &Value) -> Vec<String> {
    frame["groups"]
        .as_array()
        .map(|groups| {
            groups
                .iter()
                .filter_map(|group| group["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが {"status":"ok"} を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let body = server.get_json("/api/health").await;

    // then (期待する結果):
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_connection_without_username_is_rejected() {
    // テスト項目: username が無い接続要求はアップグレード前に 400 で拒否される
    // given (前提条件):
    let server = TestServer::start().await;
    let url = format!("ws://{}/ws", server.addr);

    // when (操作):
    let result = connect_async(url).await;

    // then (期待する結果):
    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 400),
        Err(other) => panic!("Unexpected error: {}", other),
        Ok(_) => panic!("Connection should have been rejected"),
    }
}

#[tokio::test]
async fn test_private_message_is_delivered_once() {
    // テスト項目: A → B の private_message が B にちょうど 1 通、from = A で届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server, "alice").await;
    let mut bob = TestClient::connect(&server, "bob").await;

    // when (操作):
    alice
        .send(json!({"type": "private_message", "from": "mallory", "to": "bob", "content": "hi"}))
        .await;

    // then (期待する結果):
    let message = bob.recv_type("private_message").await;
    assert_eq!(message["from"], "alice");
    assert_eq!(message["to"], "bob");
    assert_eq!(message["content"], "hi");
    let duplicate = bob
        .recv_matching(QUIET, |frame| frame["type"] == "private_message")
        .await;
    assert!(duplicate.is_none());
}

#[tokio::test]
async fn test_group_list_is_filtered_per_member() {
    // テスト項目: グループ作成後、メンバーの group_list にだけ "team" が含まれる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server, "alice").await;
    let mut bob = TestClient::connect(&server, "bob").await;
    let mut carol = TestClient::connect(&server, "carol").await;
    let mut dave = TestClient::connect(&server, "dave").await;

    // when (操作):
    alice
        .send(json!({"type": "create_group", "group_name": "team", "members": ["bob", "carol"]}))
        .await;

    // then (期待する結果):
    for client in [&mut bob, &mut carol] {
        let list = client
            .recv_matching(WAIT, |frame| {
                frame["type"] == "group_list" && group_ids(frame).contains(&"team".to_string())
            })
            .await
            .expect("Member did not receive the new group");
        assert_eq!(list["groups"][0]["admin"], "alice");
        assert_eq!(list["groups"][0]["members"], json!(["alice", "bob", "carol"]));
    }
    let leaked = dave
        .recv_matching(QUIET, |frame| {
            frame["type"] == "group_list" && group_ids(frame).contains(&"team".to_string())
        })
        .await;
    assert!(leaked.is_none());

    let groups = server.get_json("/api/groups").await;
    assert_eq!(groups[0]["id"], "team");
    assert_eq!(groups[0]["admin"], "alice");
    assert_eq!(groups[0]["members"], json!(["alice", "bob", "carol"]));

    // 作成者にも group_list が届く
    let own = alice
        .recv_matching(WAIT, |frame| frame["type"] == "group_list" && !group_ids(frame).is_empty())
        .await;
    assert!(own.is_some());
}

#[tokio::test]
async fn test_admin_leaving_hands_group_to_remaining_member() {
    // テスト項目: 管理者 A が抜けると、管理者は B、メンバーは {B} になる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server, "alice").await;
    let mut bob = TestClient::connect(&server, "bob").await;
    alice
        .send(json!({"type": "create_group", "group_name": "team", "members": ["bob"]}))
        .await;
    bob.recv_matching(WAIT, |frame| {
        frame["type"] == "group_list" && group_ids(frame).contains(&"team".to_string())
    })
    .await
    .expect("Group was not created");

    // when (操作):
    alice.send(json!({"type": "leave_group", "group_id": "team"})).await;

    // then (期待する結果):
    let list = bob
        .recv_matching(WAIT, |frame| {
            frame["type"] == "group_list" && frame["groups"][0]["admin"] == "bob"
        })
        .await
        .expect("Admin was not handed over");
    assert_eq!(list["groups"][0]["members"], json!(["bob"]));

    let groups = server.get_json("/api/groups").await;
    assert_eq!(groups[0]["admin"], "bob");
    assert_eq!(groups[0]["members"], json!(["bob"]));
}

#[tokio::test]
async fn test_history_of_messages_sent_while_offline() {
    // テスト項目: B がオフラインの間に A が送った 3 通を、B が接続後に送信順で取得できる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server, "alice").await;
    for text in ["one", "two", "three"] {
        alice
            .send(json!({"type": "private_message", "to": "bob", "content": text}))
            .await;
        alice
            .recv_matching(WAIT, |frame| {
                frame["type"] == "system"
                    && frame["content"]
                        .as_str()
                        .is_some_and(|c| c.starts_with("bob is not online"))
            })
            .await
            .expect("Sender was not told that bob is offline");
    }
    let mut bob = TestClient::connect(&server, "bob").await;

    // when (操作):
    bob.send(json!({"type": "request_history", "to": "private", "content": "alice"}))
        .await;

    // then (期待する結果):
    let history = bob.recv_type("history").await;
    assert_eq!(history["chat_type"], "private");
    assert_eq!(history["chat_id"], "alice");
    let contents: Vec<&str> = history["content"]
        .as_array()
        .expect("history content should be an array")
        .iter()
        .filter_map(|message| message["content"].as_str())
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_reconnect_replaces_previous_connection() {
    // テスト項目: 同じハンドルで再接続すると古い接続は閉じられ、新しい接続だけが残る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut bob = TestClient::connect(&server, "bob").await;
    let mut first = TestClient::connect(&server, "alice").await;

    // when (操作):
    let mut second = TestClient::connect(&server, "alice").await;

    // then (期待する結果):
    assert!(first.is_closed_by_server().await);
    let left = bob
        .recv_matching(QUIET, |frame| frame["content"] == "alice left the chat")
        .await;
    assert!(left.is_none());
    assert_eq!(
        server.get_json("/api/users").await,
        json!({"users": ["alice", "bob"]})
    );

    bob.send(json!({"type": "private_message", "to": "alice", "content": "still there?"}))
        .await;
    let message = second.recv_type("private_message").await;
    assert_eq!(message["content"], "still there?");
}

#[tokio::test]
async fn test_unread_count_resets_after_update_last_seen() {
    // テスト項目: 未読が届いた後、既読位置を更新すると未読数が空になる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server, "alice").await;
    let mut bob = TestClient::connect(&server, "bob").await;
    alice
        .send(json!({"type": "private_message", "to": "bob", "content": "ping"}))
        .await;
    let unread = bob
        .recv_matching(WAIT, |frame| {
            frame["type"] == "unread_count" && frame["content"] == r#"{"alice":1}"#
        })
        .await;
    assert!(unread.is_some());

    // when (操作):
    bob.send(json!({"type": "update_last_seen", "to": "alice", "content": "private"}))
        .await;

    // then (期待する結果):
    let reset = bob
        .recv_matching(WAIT, |frame| {
            frame["type"] == "unread_count" && frame["content"] == "{}"
        })
        .await;
    assert!(reset.is_some());
}
