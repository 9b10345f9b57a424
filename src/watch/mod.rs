// src/watch/mod.rs

//! Host-side file watching and change replay.
//!
//! Startup runs the pieces in order:
//! - [`readiness`]: wait until the guest instance is running.
//! - [`mounts`]: turn the instance's mounts into [`WatchRoot`]s.
//! - [`tree`]: register every eligible directory below each root.
//! - [`liveness`]: flips to alive once registration is done.
//!
//! Then [`aggregator`] batches write events per window and hands each batch
//! to [`dispatcher`], which touches the paths inside the guest.

pub mod aggregator;
pub mod dispatcher;
pub mod events;
pub mod liveness;
pub mod mounts;
pub mod readiness;
pub mod tree;
pub mod watcher;

pub use aggregator::Aggregator;
pub use dispatcher::{Dispatch, SpawnedTouches, TouchDispatcher};
pub use events::{Batch, EventKind, RawEvent};
pub use liveness::Liveness;
pub use mounts::{resolve_watch_roots, WatchRoot};
pub use readiness::{wait_for_instance, Readiness};
pub use tree::{register_roots, register_tree, TreeStats, WatchRegistry};
pub use watcher::{Notification, NotificationRx, NotifyBackend, NotifyRegistry, WatchBackend};
