//! In-memory store for the current light presentation.
//!
//! [`LightStore`] holds the single [`LightState`] instance for the
//! lifetime of the process. Every mutation is one write-locked replace,
//! so readers observe either the old or the new value and never a mix.
//! The store accepts only typed values; name validation happens before
//! anything reaches it.

use glowcast_types::{ColorName, EffectId, LightState};
use tokio::sync::RwLock;
use tracing::debug;

/// Owner of the current [`LightState`].
#[derive(Debug, Default)]
pub struct LightStore {
    current: RwLock<LightState>,
}

impl LightStore {
    /// Create a store starting at the default presentation (blue).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store starting at `initial`.
    pub fn with_initial(initial: LightState) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Read the current presentation. Never fails, never mutates.
    pub async fn get_current_color(&self) -> LightState {
        *self.current.read().await
    }

    /// Switch to a static color, replacing any running effect.
    ///
    /// Returns the new state for the caller to broadcast.
    pub async fn set_color(&self, color: ColorName) -> LightState {
        self.replace(LightState::Color(color)).await
    }

    /// Start an effect, replacing any static color.
    ///
    /// Returns the new state for the caller to broadcast.
    pub async fn set_effect(&self, effect: EffectId) -> LightState {
        self.replace(LightState::Effect(effect)).await
    }

    async fn replace(&self, next: LightState) -> LightState {
        let previous = {
            let mut current = self.current.write().await;
            std::mem::replace(&mut *current, next)
        };
        debug!(from = %previous, to = %next, "light state replaced");
        next
    }
}
