//! Integration tests for the live relay: join/presence sequences,
//! group and direct routing, typing signals, and history delivery.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Start the server on a random port and return its base URL.
async fn start_test_server() -> (String, SocketAddr) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp_dir.path().to_str().unwrap().to_string();

    let db = relay_server::db::init_db(&data_dir).expect("Failed to init DB");
    let archive = relay_server::archive::ArchiveHandle::spawn(db.clone());
    let hub = relay_server::hub::Hub::spawn(archive, 50);

    let state = relay_server::state::AppState {
        db,
        hub,
        rooms: Arc::new(vec!["sports".to_string(), "tech".to_string()]),
    };

    let app = relay_server::routes::build_router(state, &data_dir);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
        let _keep = tmp_dir;
    });

    (format!("http://{}", addr), addr)
}

async fn connect_ws(addr: SocketAddr) -> WsStream {
    let (ws_stream, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("WebSocket connect failed");
    ws_stream
}

async fn send_event(ws: &mut WsStream, event: Value) {
    ws.send(Message::Text(event.to_string().into()))
        .await
        .expect("WebSocket send failed");
}

/// Read the next JSON event, skipping control frames.
async fn next_event(ws: &mut WsStream) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Timed out waiting for event")
            .expect("Stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Read events until one of the given type arrives, returning it.
/// Intermediate events are discarded.
async fn next_event_of(ws: &mut WsStream, event_type: &str) -> Value {
    loop {
        let event = next_event(ws).await;
        if event["type"] == event_type {
            return event;
        }
    }
}

async fn join(ws: &mut WsStream, identity: &str, room: &str) {
    send_event(ws, json!({"type": "join", "identity": identity, "room": room})).await;
}

#[tokio::test]
async fn two_clients_share_a_room() {
    let (_base_url, addr) = start_test_server().await;

    let mut c1 = connect_ws(addr).await;
    join(&mut c1, "alice", "sports").await;

    // alice: private welcome, 1-member roster, then history
    let welcome = next_event(&mut c1).await;
    assert_eq!(welcome["type"], "system-notice");
    assert_eq!(welcome["from"], "bot");
    assert!(welcome["body"].as_str().unwrap().contains("Welcome to sports, alice"));
    let roster = next_event(&mut c1).await;
    assert_eq!(roster["type"], "roster");
    assert_eq!(roster["members"], json!(["alice"]));
    let history = next_event_of(&mut c1, "history").await;
    assert!(history["messages"].as_array().unwrap().is_empty());

    // bob joins the same room
    let mut c2 = connect_ws(addr).await;
    join(&mut c2, "bob", "sports").await;

    // alice sees the joined notice and the refreshed 2-member roster
    let joined = next_event(&mut c1).await;
    assert_eq!(joined["type"], "system-notice");
    assert!(joined["body"].as_str().unwrap().contains("bob has joined"));
    let roster = next_event(&mut c1).await;
    assert_eq!(roster["members"], json!(["alice", "bob"]));

    // bob sees his own welcome and the same roster
    let welcome = next_event(&mut c2).await;
    assert!(welcome["body"].as_str().unwrap().contains("Welcome to sports, bob"));
    let roster = next_event(&mut c2).await;
    assert_eq!(roster["members"], json!(["alice", "bob"]));
    next_event_of(&mut c2, "history").await;

    // alice sends a group message; both clients receive it once
    send_event(&mut c1, json!({"type": "message", "body": "hi"})).await;
    for ws in [&mut c1, &mut c2] {
        let msg = next_event_of(ws, "group-message").await;
        assert_eq!(msg["sender"], "alice");
        assert_eq!(msg["room"], "sports");
        assert_eq!(msg["body"], "hi");
    }

    // bob disconnects abruptly; alice sees the left notice and roster
    drop(c2);
    let left = next_event_of(&mut c1, "system-notice").await;
    assert!(left["body"].as_str().unwrap().contains("bob has left"));
    let roster = next_event_of(&mut c1, "roster").await;
    assert_eq!(roster["members"], json!(["alice"]));
}

#[tokio::test]
async fn direct_messages_route_by_identity() {
    let (_base_url, addr) = start_test_server().await;

    let mut c1 = connect_ws(addr).await;
    let mut c2 = connect_ws(addr).await;
    join(&mut c1, "alice", "sports").await;
    join(&mut c2, "bob", "tech").await;
    next_event_of(&mut c1, "history").await;
    next_event_of(&mut c2, "history").await;

    // alice -> bob across rooms
    send_event(
        &mut c1,
        json!({"type": "direct-message", "recipient": "bob", "body": "psst"}),
    )
    .await;

    let to_bob = next_event_of(&mut c2, "direct-message").await;
    assert_eq!(to_bob["sender"], "alice");
    assert_eq!(to_bob["body"], "psst");

    // alice gets an echo
    let echo = next_event_of(&mut c1, "direct-message").await;
    assert_eq!(echo["recipient"], "bob");

    // DM to an offline identity still echoes to the sender
    send_event(
        &mut c1,
        json!({"type": "direct-message", "recipient": "ghost", "body": "hello?"}),
    )
    .await;
    let echo = next_event_of(&mut c1, "direct-message").await;
    assert_eq!(echo["recipient"], "ghost");
}

#[tokio::test]
async fn typing_signals_reach_the_room_but_not_the_sender() {
    let (_base_url, addr) = start_test_server().await;

    let mut c1 = connect_ws(addr).await;
    join(&mut c1, "alice", "sports").await;
    next_event_of(&mut c1, "history").await;

    let mut c2 = connect_ws(addr).await;
    join(&mut c2, "bob", "sports").await;
    next_event_of(&mut c2, "history").await;
    // consume bob's join as seen by alice (notice + roster)
    next_event_of(&mut c1, "roster").await;

    send_event(&mut c1, json!({"type": "typing", "room": "sports"})).await;
    let typing = next_event_of(&mut c2, "typing").await;
    assert_eq!(typing["identity"], "alice");

    send_event(&mut c1, json!({"type": "stop-typing", "room": "sports"})).await;
    let stop = next_event(&mut c2).await;
    assert_eq!(stop["type"], "stop-typing");

    // A group message from bob arrives at alice with no typing frames
    // queued before it — alice never saw her own signals.
    send_event(&mut c2, json!({"type": "message", "body": "done"})).await;
    let next = next_event(&mut c1).await;
    assert_eq!(next["type"], "group-message");
}

#[tokio::test]
async fn history_is_delivered_on_join_and_queryable_over_rest() {
    let (base_url, addr) = start_test_server().await;

    let mut c1 = connect_ws(addr).await;
    join(&mut c1, "alice", "sports").await;
    next_event_of(&mut c1, "history").await;

    send_event(&mut c1, json!({"type": "message", "body": "first"})).await;
    next_event_of(&mut c1, "group-message").await;
    send_event(&mut c1, json!({"type": "message", "body": "second"})).await;
    next_event_of(&mut c1, "group-message").await;
    // typing must never show up in history
    send_event(&mut c1, json!({"type": "typing", "room": "sports"})).await;
    send_event(
        &mut c1,
        json!({"type": "direct-message", "recipient": "bob", "body": "aside"}),
    )
    .await;
    next_event_of(&mut c1, "direct-message").await;

    // A late joiner receives the room history, oldest first
    let mut c2 = connect_ws(addr).await;
    join(&mut c2, "bob", "sports").await;
    let history = next_event_of(&mut c2, "history").await;
    let bodies: Vec<&str> = history["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["first", "second"]);

    // Same view over REST
    let client = reqwest::Client::new();
    let response: Value = client
        .get(format!("{}/api/rooms/sports/messages", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bodies: Vec<&str> = response["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["first", "second"]);

    // The DM shows up only in the pair history
    let response: Value = client
        .get(format!("{}/api/dm/alice/bob/messages", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let messages = response["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["body"], "aside");
    assert_eq!(messages[0]["recipient"], "bob");
}

#[tokio::test]
async fn rooms_catalog_and_health() {
    let (base_url, _addr) = start_test_server().await;
    let client = reqwest::Client::new();

    let response: Value = client
        .get(format!("{}/api/rooms", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["rooms"], json!(["sports", "tech"]));

    let health = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), 200);
    assert_eq!(health.text().await.unwrap(), "ok");
}
