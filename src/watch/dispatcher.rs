// src/watch/dispatcher.rs

//! Fan a closed batch out to guest `touch` commands.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::guest::{self, GuestActions};
use crate::watch::events::Batch;

/// Receives each closed batch from the aggregator.
///
/// Implementations must not block: the aggregator hands the batch over and
/// immediately starts the next window.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, batch: Batch);
}

/// Result of [`TouchDispatcher::spawn_touches`].
#[derive(Debug)]
pub struct SpawnedTouches {
    /// One handle per touched path, in batch order.
    pub handles: Vec<JoinHandle<()>>,
    /// Events discarded because the batch exceeded the limit.
    pub dropped: usize,
}

/// Touches every retained event's path inside the guest, one detached task
/// per event. Failures are logged and never retried.
#[derive(Clone)]
pub struct TouchDispatcher {
    guest: Arc<dyn GuestActions>,
    max_batch: usize,
}

impl std::fmt::Debug for TouchDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TouchDispatcher")
            .field("max_batch", &self.max_batch)
            .finish_non_exhaustive()
    }
}

impl TouchDispatcher {
    pub fn new(guest: Arc<dyn GuestActions>, max_batch: usize) -> Self {
        Self { guest, max_batch }
    }

    /// Like [`Dispatch::dispatch`], but returns the per-event task handles
    /// and the overflow count.
    pub fn spawn_touches(&self, mut batch: Batch) -> SpawnedTouches {
        if batch.is_empty() {
            return SpawnedTouches {
                handles: Vec::new(),
                dropped: 0,
            };
        }

        let total = batch.len();
        let dropped = batch.truncate_to(self.max_batch);
        if dropped > 0 {
            debug!(
                total,
                dropped,
                max = self.max_batch,
                "more events than the batch limit; discarding the extra"
            );
        }

        let handles = batch
            .into_events()
            .into_iter()
            .map(|event| {
                let guest = Arc::clone(&self.guest);
                tokio::spawn(async move {
                    trace!(path = %event.path.display(), "modified, touching...");
                    if let Err(err) = guest::touch(guest.as_ref(), &event.path).await {
                        warn!(path = %event.path.display(), error = %err, "touch failed");
                    }
                })
            })
            .collect();

        SpawnedTouches { handles, dropped }
    }
}

impl Dispatch for TouchDispatcher {
    fn dispatch(&self, batch: Batch) {
        // Detached: nobody waits for the touches.
        drop(self.spawn_touches(batch).handles);
    }
}
