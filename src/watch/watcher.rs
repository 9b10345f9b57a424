// src/watch/watcher.rs

use std::path::Path;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::errors::Result;
use crate::watch::tree::WatchRegistry;

/// A notification from the watch backend: an event or a backend error.
pub type Notification = notify::Result<Event>;

/// Receiving end of the backend's notification stream.
pub type NotificationRx = mpsc::UnboundedReceiver<Notification>;

/// Factory for the watch primitive.
///
/// Production uses [`NotifyBackend`]; tests hand out a recording registry and
/// keep the sending half of the notification stream.
pub trait WatchBackend: Send + Sync {
    fn open(&self) -> Result<(Box<dyn WatchRegistry>, NotificationRx)>;
}

/// Backend built on `notify`'s platform watcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyBackend;

impl WatchBackend for NotifyBackend {
    fn open(&self) -> Result<(Box<dyn WatchRegistry>, NotificationRx)> {
        let (registry, rx) = NotifyRegistry::new()?;
        Ok((Box::new(registry), rx))
    }
}

/// Owns the `RecommendedWatcher`. Dropping it releases every watch handle
/// and closes the notification stream.
pub struct NotifyRegistry {
    inner: RecommendedWatcher,
}

impl std::fmt::Debug for NotifyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyRegistry").finish()
    }
}

impl NotifyRegistry {
    pub fn new() -> Result<(Self, NotificationRx)> {
        // Channel from the blocking notify callback into the async world.
        let (tx, rx) = mpsc::unbounded_channel::<Notification>();

        let inner = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if tx.send(res).is_err() {
                    // Receiver gone: the aggregator has already stopped.
                    tracing::trace!("dropping notification after shutdown");
                }
            },
            Config::default(),
        )?;

        Ok((Self { inner }, rx))
    }
}

impl WatchRegistry for NotifyRegistry {
    fn add(&mut self, path: &Path) -> Result<()> {
        self.inner.watch(path, RecursiveMode::NonRecursive)?;
        Ok(())
    }
}
