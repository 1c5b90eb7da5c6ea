//! End-to-end tests for the viewer `WebSocket`.
//!
//! Each test serves the real router on `127.0.0.1:0` and connects with a
//! `tokio-tungstenite` client, so frames go through the same socket task
//! a browser overlay talks to.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use glowcast_overlay::router::build_router;
use glowcast_overlay::state::AppState;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve() -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::new());
    let router = build_router(Arc::clone(&state), None);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (state, addr)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    client
}

/// Next frame from the server, skipping control frames.
async fn next_state(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn trigger(addr: SocketAddr, path: &str) -> reqwest::StatusCode {
    reqwest::get(format!("http://{addr}{path}"))
        .await
        .unwrap()
        .status()
}

async fn wait_for_viewers(state: &AppState, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.overlay.viewer_count().await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn viewer_gets_snapshot_then_each_mutation() {
    let (state, addr) = serve().await;
    let mut client = connect(addr).await;

    assert_eq!(next_state(&mut client).await, json!({"mode": "color", "value": "blue"}));

    assert_eq!(trigger(addr, "/lights/red").await, reqwest::StatusCode::OK);
    assert_eq!(next_state(&mut client).await, json!({"mode": "color", "value": "red"}));

    assert_eq!(trigger(addr, "/lights/effects/rainbow").await, reqwest::StatusCode::OK);
    assert_eq!(
        next_state(&mut client).await,
        json!({"mode": "effect", "value": "rainbow"})
    );

    client.close(None).await.unwrap();
    wait_for_viewers(&state, 0).await;
}

#[tokio::test]
async fn late_viewer_snapshot_is_current_state() {
    let (_state, addr) = serve().await;
    let mut early = connect(addr).await;
    assert_eq!(next_state(&mut early).await["value"], "blue");

    assert_eq!(trigger(addr, "/lights/green").await, reqwest::StatusCode::OK);
    assert_eq!(next_state(&mut early).await["value"], "green");

    let mut late = connect(addr).await;
    assert_eq!(next_state(&mut late).await, json!({"mode": "color", "value": "green"}));
}

#[tokio::test]
async fn rejected_trigger_sends_no_frame() {
    let (_state, addr) = serve().await;
    let mut client = connect(addr).await;
    assert_eq!(next_state(&mut client).await["value"], "blue");

    assert_eq!(
        trigger(addr, "/lights/chartreuse").await,
        reqwest::StatusCode::BAD_REQUEST
    );
    assert_eq!(trigger(addr, "/lights/pink").await, reqwest::StatusCode::OK);

    // The next frame is the accepted change, nothing for the rejected one.
    assert_eq!(next_state(&mut client).await["value"], "pink");
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let (_state, addr) = serve().await;
    let mut client = connect(addr).await;
    next_state(&mut client).await;

    client
        .send(Message::Ping(vec![7_u8, 7, 7].into()))
        .await
        .unwrap();

    let pong = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Message::Pong(payload) = client.next().await.unwrap().unwrap() {
                return payload;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(pong.as_ref(), &[7_u8, 7, 7]);
}

#[tokio::test]
async fn dropped_client_is_unregistered() {
    let (state, addr) = serve().await;
    let mut first = connect(addr).await;
    let mut second = connect(addr).await;
    next_state(&mut first).await;
    next_state(&mut second).await;
    wait_for_viewers(&state, 2).await;

    drop(first);
    wait_for_viewers(&state, 1).await;

    // The remaining viewer keeps receiving.
    assert_eq!(trigger(addr, "/lights/orange").await, reqwest::StatusCode::OK);
    assert_eq!(next_state(&mut second).await["value"], "orange");
}
