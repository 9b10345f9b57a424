// src/watch/readiness.rs

//! Block until the guest instance reports itself running.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::instance::InstanceSource;

/// How [`wait_for_instance`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Cancelled,
}

/// Poll `source` every `interval` until the instance is running or `cancel`
/// fires. There is no upper bound on the wait.
///
/// Query errors are not fatal; the next tick simply polls again.
pub async fn wait_for_instance(
    source: &dyn InstanceSource,
    interval: Duration,
    cancel: &CancellationToken,
) -> Readiness {
    loop {
        trace!("waiting for instance...");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Readiness::Cancelled,
            _ = tokio::time::sleep(interval) => {}
        }

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Readiness::Cancelled,
            status = source.current_instance() => status,
        };

        match status {
            Ok(instance) if instance.running() => {
                info!(instance = %instance.name, "instance is running");
                return Readiness::Ready;
            }
            Ok(instance) => {
                trace!(instance = %instance.name, status = %instance.status, "instance not running yet");
            }
            Err(err) => {
                debug!(error = %err, "failed to query instance state");
            }
        }
    }
}
