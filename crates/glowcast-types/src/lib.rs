//! Shared type definitions for the Glowcast overlay server.
//!
//! These types are the wire vocabulary between the overlay server and
//! its browser viewers. They flow downstream to `TypeScript` via `ts-rs`
//! so the overlay page decodes exactly what the server pushes.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers (viewer identity)
//! - [`light`] -- Color and effect sets, the current [`LightState`]

pub mod ids;
pub mod light;

// Re-export all public types at crate root for convenience.
pub use ids::ViewerId;
pub use light::{ColorName, EffectId, InputKind, InvalidInput, LightState};
