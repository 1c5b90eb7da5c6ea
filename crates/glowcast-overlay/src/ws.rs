//! `WebSocket` handler for overlay viewers.
//!
//! Clients connect to `GET /ws` and receive a JSON-encoded
//! [`LightState`](glowcast_types::LightState) text frame immediately
//! (the state at join time) and then one frame per committed mutation,
//! in commit order. Viewers are read-only; client text and binary
//! frames are ignored.
//!
//! The connection ends when the client closes, a send fails, or the
//! registry drops this viewer (its queue filled up). In every case the
//! viewer is unregistered on the way out.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use crate::gateway::ViewerConnection;
use crate::state::AppState;

/// Upgrade an HTTP request to a viewer `WebSocket`.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_viewer(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Register the viewer, forward its queue to the socket, unregister.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let ViewerConnection { id, mut updates } = state.overlay.connect_viewer().await;
    debug!(viewer = %id, "WebSocket viewer connected");

    loop {
        tokio::select! {
            next = updates.recv() => {
                let Some(light) = next else {
                    debug!(viewer = %id, "viewer dropped by registry, closing");
                    break;
                };
                let json = match serde_json::to_string(&light) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!("Failed to serialize light state: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(viewer = %id, "WebSocket viewer disconnected (send failed)");
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(viewer = %id, "WebSocket viewer disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(viewer = %id, "WebSocket viewer disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(viewer = %id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    state.overlay.disconnect_viewer(id).await;
}
