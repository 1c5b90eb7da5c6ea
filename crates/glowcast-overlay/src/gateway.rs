//! The mutation gateway: the only write path to the light state.
//!
//! [`Overlay`] owns the [`LightStore`] and the [`ViewerRegistry`] and
//! exposes the operations triggers and viewers need. Mutations run
//! validate, store, publish under one write guard, so two concurrent
//! triggers cannot interleave and every viewer sees publishes in commit
//! order. Joining viewers take the same guard, which makes "snapshot,
//! then register" atomic with respect to publishes.

use chrono::Utc;
use glowcast_types::{ColorName, EffectId, LightState, ViewerId};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::broadcast::ViewerRegistry;
use crate::error::OverlayError;
use crate::notify::Notifier;
use crate::store::LightStore;

/// A registered viewer: its id and its update queue.
///
/// The first item on `updates` is the state at the moment of joining.
#[derive(Debug)]
pub struct ViewerConnection {
    /// Registry key, used to disconnect.
    pub id: ViewerId,
    /// Ordered light states for this viewer.
    pub updates: mpsc::Receiver<LightState>,
}

/// Application-owned light state plus its viewers.
#[derive(Debug, Default)]
pub struct Overlay {
    store: LightStore,
    viewers: ViewerRegistry,
    write_guard: Mutex<()>,
    notifier: Notifier,
}

impl Overlay {
    /// Create an overlay at the default state with notifications off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an overlay that announces changes through `notifier`.
    pub fn with_notifier(notifier: Notifier) -> Self {
        Self {
            notifier,
            ..Self::default()
        }
    }

    /// The current light presentation.
    pub async fn current(&self) -> LightState {
        self.store.get_current_color().await
    }

    /// Validate `requested` as a color and apply it.
    ///
    /// On success the new state has been stored and queued for every
    /// viewer before this returns. Unsupported names leave the state
    /// untouched and publish nothing.
    pub async fn change_color(&self, requested: &str) -> Result<LightState, OverlayError> {
        let color: ColorName = requested.parse()?;
        Ok(self.apply(LightState::Color(color)).await)
    }

    /// Validate `requested` as an effect and apply it.
    ///
    /// Same contract as [`Overlay::change_color`].
    pub async fn send_effect(&self, requested: &str) -> Result<LightState, OverlayError> {
        let effect: EffectId = requested.parse()?;
        Ok(self.apply(LightState::Effect(effect)).await)
    }

    /// Register a new viewer whose queue starts with the current state.
    pub async fn connect_viewer(&self) -> ViewerConnection {
        let _guard = self.write_guard.lock().await;
        let (id, updates) = self.viewers.subscribe(&self.store).await;
        ViewerConnection { id, updates }
    }

    /// Remove a viewer. Safe to call for a viewer that is already gone.
    pub async fn disconnect_viewer(&self, id: ViewerId) {
        let _guard = self.write_guard.lock().await;
        if let Some(connected_at) = self.viewers.unsubscribe(id).await {
            let seconds = Utc::now()
                .signed_duration_since(connected_at)
                .num_seconds();
            debug!(viewer = %id, seconds, "viewer disconnected");
        }
    }

    /// Number of connected viewers.
    pub async fn viewer_count(&self) -> usize {
        self.viewers.viewer_count().await
    }

    async fn apply(&self, next: LightState) -> LightState {
        let (state, report) = {
            let _guard = self.write_guard.lock().await;
            let state = match next {
                LightState::Color(color) => self.store.set_color(color).await,
                LightState::Effect(effect) => self.store.set_effect(effect).await,
            };
            let report = self.viewers.publish(state).await;
            (state, report)
        };

        info!(
            mode = state.mode(),
            value = state.value(),
            delivered = report.delivered,
            pruned = report.pruned,
            "light state changed"
        );

        // Detached; the trigger response never waits on it.
        drop(self.notifier.notify(state));

        state
    }
}
