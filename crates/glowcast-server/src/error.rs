//! Error types for the server binary.
//!
//! Covers bootstrap only: configuration and the optional bot session.
//! Listener failures surface as the overlay crate's `ServerError` and
//! request-level errors as its `OverlayError`.

/// Errors that can occur while starting or running the server process.
#[derive(Debug, thiserror::Error)]
pub enum ServerAppError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// An external integration call failed.
    #[error("integration error: {0}")]
    Integration(String),
}
