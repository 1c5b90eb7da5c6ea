//! Error types for the overlay API.
//!
//! [`OverlayError`] covers everything a trigger request can be told
//! about. Viewer delivery failures and integration failures are handled
//! where they happen and never reach a caller, so they have no variant
//! here. The [`IntoResponse`](axum::response::IntoResponse)
//! implementation renders `{"error": ..., "status": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use glowcast_types::InvalidInput;

/// Errors a mutation request can produce.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    /// The requested color or effect is not in the supported set.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
}

impl IntoResponse for OverlayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
