//! End-to-end WebSocket behavior against a bound server

use std::{net::SocketAddr, sync::Arc, time::Duration};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

use countdown_relay::{
    api::create_router,
    control::gate::AllowAll,
    state::AppState,
    tasks::broadcast_pulse_task,
};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server(duration: Duration) -> (SocketAddr, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        0,
        "127.0.0.1".to_string(),
        duration,
        Arc::new(AllowAll),
    ));

    let pulse_state = Arc::clone(&state);
    tokio::spawn(async move {
        broadcast_pulse_task(pulse_state).await;
    });

    let app = create_router(Arc::clone(&state));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, state)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("connect");
    ws
}

async fn next_json(ws: &mut WsClient) -> Value {
    let frame = ws.next().await.expect("frame").expect("frame");
    match frame {
        Message::Text(text) => serde_json::from_str(&text).expect("json"),
        other => panic!("unexpected frame: {:?}", other),
    }
}

#[tokio::test]
async fn joining_viewer_receives_current_state_once_and_immediately() {
    let (addr, state) = spawn_server(Duration::from_secs(600)).await;
    let mut ws = connect(addr).await;

    let first = next_json(&mut ws).await;
    let snapshot = state.snapshot().expect("snapshot");
    assert_eq!(first["type"], "time-sync");
    assert_eq!(first["time"], snapshot.remaining_seconds);
    assert_eq!(first["isRunning"], false);
    assert_eq!(first["isPaused"], false);

    // Stopped clock and no commands: the initial sync is the only frame.
    let quiet = tokio::time::timeout(Duration::from_millis(300), ws.next()).await;
    assert!(quiet.is_err(), "expected no frame beyond the initial sync");
}

#[tokio::test]
async fn viewer_joining_mid_run_sees_the_running_state_first() {
    let (addr, _state) = spawn_server(Duration::from_secs(600)).await;

    let mut admin = connect(addr).await;
    let _ = next_json(&mut admin).await; // initial sync
    admin
        .send(Message::Text(r#"{"type":"START"}"#.into()))
        .await
        .expect("send");
    let started = next_json(&mut admin).await;
    assert_eq!(started["isRunning"], true);

    let mut viewer = connect(addr).await;
    let first = next_json(&mut viewer).await;
    assert_eq!(first["type"], "time-sync");
    assert_eq!(first["isRunning"], true);
    assert!(first["time"].as_u64().expect("time") <= 600);
}

#[tokio::test]
async fn accepted_command_reaches_every_connected_viewer() {
    let (addr, _state) = spawn_server(Duration::from_secs(600)).await;

    let mut admin = connect(addr).await;
    let mut viewer = connect(addr).await;
    let _ = next_json(&mut admin).await;
    let _ = next_json(&mut viewer).await;

    admin
        .send(Message::Text(r#"{"type":"START"}"#.into()))
        .await
        .expect("send");

    // Both the sender and the other viewer observe the new state.
    let seen_by_viewer = next_json(&mut viewer).await;
    assert_eq!(seen_by_viewer["isRunning"], true);
    let seen_by_admin = next_json(&mut admin).await;
    assert_eq!(seen_by_admin["isRunning"], true);
}

#[tokio::test]
async fn malformed_control_messages_produce_no_broadcast() {
    let (addr, _state) = spawn_server(Duration::from_secs(600)).await;

    let mut admin = connect(addr).await;
    let mut viewer = connect(addr).await;
    let _ = next_json(&mut admin).await;
    let _ = next_json(&mut viewer).await;

    admin
        .send(Message::Text(r#"{"type":"RESET"}"#.into()))
        .await
        .expect("send");
    admin
        .send(Message::Text("not json at all".into()))
        .await
        .expect("send");

    let quiet = tokio::time::timeout(Duration::from_millis(300), viewer.next()).await;
    assert!(quiet.is_err(), "malformed commands must not fan out");
}
