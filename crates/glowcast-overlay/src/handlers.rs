//! REST endpoint handlers for the overlay server.
//!
//! Trigger handlers go through [`Overlay`](crate::gateway::Overlay) and
//! never touch the store directly. Read handlers only read.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/lights/{color}` | Switch to a static color |
//! | `GET` | `/lights/effects/{effect}` | Start an effect |
//! | `GET` | `/bulb/color` | Current presentation value |
//! | `GET` | `/overlay-colors` | HTML trigger page |
//! | `GET` | `/health` | Liveness and viewer count |

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::Utc;
use glowcast_types::{ColorName, EffectId, LightState};
use serde::Serialize;

use crate::error::OverlayError;
use crate::state::AppState;

/// Body of `GET /bulb/color`.
#[derive(Debug, Serialize)]
pub struct BulbColor {
    /// Color name or effect id currently shown.
    pub color: &'static str,
}

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// Switch the light to a static color and push it to every viewer.
///
/// Responds with the committed state, or 400 for an unsupported color.
pub async fn change_color(
    State(state): State<Arc<AppState>>,
    Path(color): Path<String>,
) -> Result<Json<LightState>, OverlayError> {
    let light = state.overlay.change_color(&color).await?;
    Ok(Json(light))
}

/// Start a light effect and push it to every viewer.
///
/// Responds with the committed state, or 400 for an unsupported effect.
pub async fn send_effect(
    State(state): State<Arc<AppState>>,
    Path(effect): Path<String>,
) -> Result<Json<LightState>, OverlayError> {
    let light = state.overlay.send_effect(&effect).await?;
    Ok(Json(light))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Report the current presentation value.
pub async fn bulb_color(State(state): State<Arc<AppState>>) -> Json<BulbColor> {
    let light = state.overlay.current().await;
    Json(BulbColor {
        color: light.value(),
    })
}

/// Liveness check with the number of connected viewers.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime_seconds = Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds();
    Json(serde_json::json!({
        "status": "ok",
        "viewers": state.overlay.viewer_count().await,
        "uptime_seconds": uptime_seconds,
    }))
}

/// Serve an HTML page with a trigger link for every color and effect.
pub async fn overlay_colors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let current = state.overlay.current().await;
    let viewers = state.overlay.viewer_count().await;

    let colors: String = ColorName::ALL
        .iter()
        .map(|color| {
            format!(
                "        <a class=\"swatch swatch-{color}\" href=\"/lights/{color}\">{color}</a>\n"
            )
        })
        .collect();
    let effects: String = EffectId::ALL
        .iter()
        .map(|effect| {
            format!("        <a class=\"swatch\" href=\"/lights/effects/{effect}\">{effect}</a>\n")
        })
        .collect();
    let mode = current.mode();
    let value = current.value();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Glowcast Overlay Colors</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .current {{ color: #3fb950; font-weight: bold; }}
        .swatch {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 0.75rem 1.25rem;
            margin: 0.4rem 0.4rem 0.4rem 0;
            color: #c9d1d9;
            text-decoration: none;
        }}
        .swatch:hover {{ border-color: #58a6ff; }}
        .swatch-red {{ border-left: 6px solid #f85149; }}
        .swatch-orange {{ border-left: 6px solid #f0883e; }}
        .swatch-yellow {{ border-left: 6px solid #e3b341; }}
        .swatch-green {{ border-left: 6px solid #3fb950; }}
        .swatch-blue {{ border-left: 6px solid #58a6ff; }}
        .swatch-purple {{ border-left: 6px solid #a371f7; }}
        .swatch-pink {{ border-left: 6px solid #f778ba; }}
        .swatch-white {{ border-left: 6px solid #f0f6fc; }}
        .swatch-cyan {{ border-left: 6px solid #39c5cf; }}
        .swatch-magenta {{ border-left: 6px solid #db61a2; }}
        .swatch-warm {{ border-left: 6px solid #ffd8a8; }}
        .swatch-off {{ border-left: 6px solid #30363d; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Glowcast</h1>
    <p class="subtitle">Ambient light overlay</p>

    <p>Current {mode}: <span class="current">{value}</span> &middot; {viewers} viewer(s) connected</p>

    <hr>

    <h2>Colors</h2>
    <div>
{colors}    </div>

    <h2>Effects</h2>
    <div>
{effects}    </div>
</body>
</html>"#
    ))
}
