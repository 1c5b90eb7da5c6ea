//! Shared application state for the overlay server.
//!
//! [`AppState`] is the explicit application context: it owns the one
//! [`Overlay`] for the process and is injected into every handler via
//! Axum's `State` extractor. Nothing else holds the light state.

use chrono::{DateTime, Utc};

use crate::gateway::Overlay;
use crate::notify::Notifier;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) by the router.
#[derive(Debug)]
pub struct AppState {
    /// The light state, its viewers, and the mutation path.
    pub overlay: Overlay,
    /// When this state was created (process start in production).
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create application state with notifications off.
    pub fn new() -> Self {
        Self::with_notifier(Notifier::Disabled)
    }

    /// Create application state announcing changes through `notifier`.
    pub fn with_notifier(notifier: Notifier) -> Self {
        Self {
            overlay: Overlay::with_notifier(notifier),
            started_at: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
