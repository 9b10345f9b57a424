// src/watch/aggregator.rs

//! The event loop: collect write events for one window, hand the batch to
//! the dispatcher, start the next window.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::errors::{Result, TouchbridgeError};
use crate::watch::dispatcher::Dispatch;
use crate::watch::events::{Batch, RawEvent};
use crate::watch::mounts::WatchRoot;
use crate::watch::tree::is_below_hidden_dir;
use crate::watch::watcher::{Notification, NotificationRx};

/// How a collection window ended.
#[derive(Debug, PartialEq, Eq)]
enum Window {
    Closed(Batch),
    Cancelled,
}

/// Single serial consumer of the notification stream.
pub struct Aggregator<D: Dispatch> {
    rx: NotificationRx,
    dispatcher: D,
    window: Duration,
    roots: Vec<WatchRoot>,
}

impl<D: Dispatch> std::fmt::Debug for Aggregator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("window", &self.window)
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl<D: Dispatch> Aggregator<D> {
    pub fn new(rx: NotificationRx, dispatcher: D, window: Duration, roots: Vec<WatchRoot>) -> Self {
        Self {
            rx,
            dispatcher,
            window,
            roots,
        }
    }

    /// Run until cancelled (`Ok`) or until the notification stream closes
    /// (`Err(ChannelClosed)`). The batch of an unfinished window is dropped
    /// on cancellation.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        info!(window = ?self.window, "event aggregation started");

        loop {
            match self.collect(&cancel).await? {
                Window::Closed(batch) => {
                    if batch.is_empty() {
                        continue;
                    }
                    debug!(events = batch.len(), "dispatching batch");
                    self.dispatcher.dispatch(batch);
                }
                Window::Cancelled => {
                    info!("event aggregation cancelled");
                    return Ok(());
                }
            }
        }
    }

    async fn collect(&mut self, cancel: &CancellationToken) -> Result<Window> {
        let mut batch = Batch::new();
        let deadline = tokio::time::sleep(self.window);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(Window::Cancelled),
                _ = &mut deadline => return Ok(Window::Closed(batch)),
                notification = self.rx.recv() => match notification {
                    Some(notification) => self.accept(notification, &mut batch),
                    None => return Err(TouchbridgeError::ChannelClosed),
                },
            }
        }
    }

    fn accept(&self, notification: Notification, batch: &mut Batch) {
        let event = match notification {
            Ok(event) => event,
            Err(err) => {
                trace!(error = %err, "watch error");
                return;
            }
        };

        for raw in RawEvent::from_notify(event) {
            trace!(kind = ?raw.kind, path = %raw.path.display(), "got event");
            if !raw.is_write() {
                continue;
            }
            if is_below_hidden_dir(&self.roots, &raw.path) {
                trace!(path = %raw.path.display(), "ignoring event below hidden directory");
                continue;
            }
            batch.push(raw);
        }
    }
}
