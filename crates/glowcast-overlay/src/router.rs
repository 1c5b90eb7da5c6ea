//! Axum router construction for the overlay API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled, since overlays are loaded as browser sources from
//! arbitrary origins. When a static directory is given it serves as the
//! fallback for unmatched paths (the overlay page and its assets).

use std::path::Path;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the overlay server.
///
/// The router includes:
/// - `GET /lights/{color}` -- set a static color
/// - `GET /lights/effects/{effect}` -- start an effect
/// - `GET /bulb/color` -- current presentation value
/// - `GET /overlay-colors` -- HTML trigger page
/// - `GET /health` -- liveness and viewer count
/// - `GET /ws` -- viewer `WebSocket`
/// - anything else -- files under `static_dir`, if set
pub fn build_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        // Triggers
        .route("/lights/{color}", get(handlers::change_color))
        .route("/lights/effects/{effect}", get(handlers::send_effect))
        // Reads
        .route("/bulb/color", get(handlers::bulb_color))
        .route("/overlay-colors", get(handlers::overlay_colors))
        .route("/health", get(handlers::health))
        // WebSocket
        .route("/ws", get(ws::ws_viewer));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
