//! Viewer registry: fan-out of light state changes to connected overlays.
//!
//! Each viewer owns a bounded FIFO queue. [`ViewerRegistry::publish`]
//! walks the registry and enqueues the new state for every viewer,
//! pruning any viewer whose queue is closed or full. A viewer's socket
//! task drains its own queue, so a slow socket never holds up the
//! registry or other viewers.
//!
//! New viewers get the current state as the first message in their
//! queue, enqueued before they become visible to `publish`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use glowcast_types::{LightState, ViewerId};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::store::LightStore;

/// Maximum number of undelivered states a viewer may have queued.
///
/// A viewer this far behind is dropped; it gets a fresh snapshot when
/// it reconnects.
pub const VIEWER_QUEUE_CAPACITY: usize = 64;

/// Send side of one viewer's queue.
#[derive(Debug)]
struct ViewerHandle {
    tx: mpsc::Sender<LightState>,
    connected_at: DateTime<Utc>,
}

/// Outcome of a single [`ViewerRegistry::publish`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Viewers the state was enqueued for.
    pub delivered: usize,
    /// Viewers removed because delivery failed.
    pub pruned: usize,
}

/// Registry of connected viewers keyed by [`ViewerId`].
#[derive(Debug, Default)]
pub struct ViewerRegistry {
    viewers: Mutex<HashMap<ViewerId, ViewerHandle>>,
}

impl ViewerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a viewer and queue the current state as its first message.
    ///
    /// The snapshot is read while the registry lock is held, so no
    /// publish can slip between the snapshot and the registration.
    pub async fn subscribe(&self, store: &LightStore) -> (ViewerId, mpsc::Receiver<LightState>) {
        let id = ViewerId::new();
        let (tx, rx) = mpsc::channel(VIEWER_QUEUE_CAPACITY);

        let mut viewers = self.viewers.lock().await;
        let snapshot = store.get_current_color().await;
        // The queue is empty and its receiver is in hand, so this cannot fail.
        if let Err(e) = tx.try_send(snapshot) {
            warn!(viewer = %id, error = %e, "could not queue join snapshot");
        }
        viewers.insert(
            id,
            ViewerHandle {
                tx,
                connected_at: Utc::now(),
            },
        );
        debug!(viewer = %id, snapshot = %snapshot, viewers = viewers.len(), "viewer subscribed");

        (id, rx)
    }

    /// Remove a viewer.
    ///
    /// Returns the time the viewer connected, or `None` if it was
    /// already gone. Removing twice is the same as removing once.
    pub async fn unsubscribe(&self, id: ViewerId) -> Option<DateTime<Utc>> {
        let removed = self.viewers.lock().await.remove(&id);
        if removed.is_some() {
            debug!(viewer = %id, "viewer unsubscribed");
        }
        removed.map(|handle| handle.connected_at)
    }

    /// Queue `state` for every registered viewer.
    ///
    /// Never fails. A viewer whose queue is closed (socket task gone) or
    /// full (socket stalled) is removed and counted in
    /// [`PublishReport::pruned`]; delivery to the rest continues.
    pub async fn publish(&self, state: LightState) -> PublishReport {
        let mut report = PublishReport::default();
        let mut viewers = self.viewers.lock().await;

        viewers.retain(|id, handle| match handle.tx.try_send(state) {
            Ok(()) => {
                report.delivered = report.delivered.saturating_add(1);
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(viewer = %id, "viewer connection closed, pruning");
                report.pruned = report.pruned.saturating_add(1);
                false
            }
            Err(TrySendError::Full(_)) => {
                warn!(viewer = %id, capacity = VIEWER_QUEUE_CAPACITY, "viewer queue full, dropping viewer");
                report.pruned = report.pruned.saturating_add(1);
                false
            }
        });

        report
    }

    /// Number of registered viewers.
    pub async fn viewer_count(&self) -> usize {
        self.viewers.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use glowcast_types::{ColorName, EffectId};

    use super::*;

    #[tokio::test]
    async fn subscribe_queues_snapshot_first() {
        let store = LightStore::with_initial(LightState::Color(ColorName::Pink));
        let registry = ViewerRegistry::new();

        let (_, mut rx) = registry.subscribe(&store).await;
        assert_eq!(rx.recv().await, Some(LightState::Color(ColorName::Pink)));
        assert_eq!(registry.viewer_count().await, 1);
    }

    #[tokio::test]
    async fn publish_reaches_every_viewer_in_order() {
        let store = LightStore::new();
        let registry = ViewerRegistry::new();
        let (_, mut a) = registry.subscribe(&store).await;
        let (_, mut b) = registry.subscribe(&store).await;

        let red = LightState::Color(ColorName::Red);
        let rainbow = LightState::Effect(EffectId::Rainbow);
        assert_eq!(registry.publish(red).await.delivered, 2);
        assert_eq!(registry.publish(rainbow).await.delivered, 2);

        for rx in [&mut a, &mut b] {
            assert_eq!(rx.recv().await, Some(LightState::default()));
            assert_eq!(rx.recv().await, Some(red));
            assert_eq!(rx.recv().await, Some(rainbow));
        }
    }

    #[tokio::test]
    async fn dead_viewer_is_pruned_without_affecting_others() {
        let store = LightStore::new();
        let registry = ViewerRegistry::new();
        let (_, mut alive) = registry.subscribe(&store).await;
        let (_, dead) = registry.subscribe(&store).await;
        drop(dead);

        let report = registry.publish(LightState::Color(ColorName::Red)).await;
        assert_eq!(report, PublishReport { delivered: 1, pruned: 1 });
        assert_eq!(registry.viewer_count().await, 1);

        assert_eq!(alive.recv().await, Some(LightState::default()));
        assert_eq!(alive.recv().await, Some(LightState::Color(ColorName::Red)));
    }

    #[tokio::test]
    async fn stalled_viewer_is_dropped_when_queue_fills() {
        let store = LightStore::new();
        let registry = ViewerRegistry::new();
        let (_, mut stalled) = registry.subscribe(&store).await;

        // The snapshot already occupies one slot.
        for _ in 1..VIEWER_QUEUE_CAPACITY {
            let report = registry.publish(LightState::Color(ColorName::Red)).await;
            assert_eq!(report.delivered, 1);
        }
        let report = registry.publish(LightState::Color(ColorName::Green)).await;
        assert_eq!(report, PublishReport { delivered: 0, pruned: 1 });
        assert_eq!(registry.viewer_count().await, 0);

        // What was queued is still readable, then the queue ends.
        let mut drained = 0_usize;
        while stalled.recv().await.is_some() {
            drained = drained.saturating_add(1);
        }
        assert_eq!(drained, VIEWER_QUEUE_CAPACITY);
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let store = LightStore::new();
        let registry = ViewerRegistry::new();
        let before = Utc::now();
        let (id, _rx) = registry.subscribe(&store).await;

        let connected_at = registry.unsubscribe(id).await;
        assert!(connected_at.is_some_and(|at| at >= before && at <= Utc::now()));
        assert_eq!(registry.unsubscribe(id).await, None);
        assert_eq!(registry.viewer_count().await, 0);
    }

    #[tokio::test]
    async fn publish_with_no_viewers_is_not_an_error() {
        let registry = ViewerRegistry::new();
        let report = registry.publish(LightState::default()).await;
        assert_eq!(report, PublishReport::default());
    }
}
