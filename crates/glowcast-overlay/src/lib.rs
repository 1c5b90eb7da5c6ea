//! Overlay server for Glowcast ambient lighting.
//!
//! This crate owns the one piece of shared state in the system, the
//! current light presentation, and everything around it:
//!
//! - **State store** ([`store`]) holding the current [`LightState`]
//! - **Viewer registry** ([`broadcast`]) fanning changes out to
//!   connected overlays, with a join-time snapshot for late joiners
//! - **Mutation gateway** ([`gateway`]) validating triggers and running
//!   store-then-publish under one write guard
//! - **Change notifications** ([`notify`]) posted to a chat webhook on
//!   a detached task
//! - **HTTP surface** ([`router`], [`handlers`], [`ws`]) and server
//!   lifecycle ([`server`])
//!
//! # Architecture
//!
//! ```text
//! GET /lights/..  -->  Overlay::change_color  -->  LightStore
//!                                  |
//!                                  +--> ViewerRegistry::publish --> viewer queues --> /ws
//!                                  +--> Notifier (detached)
//! ```
//!
//! [`LightState`]: glowcast_types::LightState

pub mod broadcast;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod notify;
pub mod router;
pub mod server;
pub mod state;
pub mod store;
pub mod ws;

// Re-export primary types for convenience.
pub use gateway::{Overlay, ViewerConnection};
pub use notify::{DiscordWebhook, Notifier};
pub use router::build_router;
pub use server::{bind_listener, start_server, ServerConfig, ServerError};
pub use state::AppState;
