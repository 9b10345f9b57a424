use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use touchbridge::errors::{Result, TouchbridgeError};
use touchbridge::instance::{InstanceConfig, InstanceSource, InstanceStatus, Mount, STATUS_RUNNING};
use touchbridge::types::BoxFuture;

/// Scriptable instance: flip `running` from the test, count polls.
#[derive(Debug, Clone)]
pub struct FakeInstanceSource {
    running: Arc<AtomicBool>,
    polls: Arc<AtomicUsize>,
    config_calls: Arc<AtomicUsize>,
    mounts: Vec<Mount>,
    config_error: Option<String>,
}

impl FakeInstanceSource {
    pub fn new(running: bool, mounts: Vec<Mount>) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(running)),
            polls: Arc::new(AtomicUsize::new(0)),
            config_calls: Arc::new(AtomicUsize::new(0)),
            mounts,
            config_error: None,
        }
    }

    /// A running instance mounting the given locations.
    pub fn running(locations: &[&str]) -> Self {
        Self::new(true, locations.iter().map(|l| Mount::new(*l)).collect())
    }

    /// A stopped instance mounting the given locations.
    pub fn stopped(locations: &[&str]) -> Self {
        Self::new(false, locations.iter().map(|l| Mount::new(*l)).collect())
    }

    pub fn with_config_error(mut self, message: &str) -> Self {
        self.config_error = Some(message.to_string());
        self
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Number of `current_instance` calls so far.
    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    /// Number of `current_instance_config` calls so far.
    pub fn config_calls(&self) -> usize {
        self.config_calls.load(Ordering::SeqCst)
    }
}

impl InstanceSource for FakeInstanceSource {
    fn current_instance(&self) -> BoxFuture<'_, Result<InstanceStatus>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let status = if self.running.load(Ordering::SeqCst) {
            STATUS_RUNNING
        } else {
            "Stopped"
        };
        Box::pin(async move {
            Ok(InstanceStatus {
                name: "fake".to_string(),
                status: status.to_string(),
                dir: None,
            })
        })
    }

    fn current_instance_config(&self) -> BoxFuture<'_, Result<InstanceConfig>> {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            match &self.config_error {
                Some(message) => Err(TouchbridgeError::InstanceConfig(message.clone())),
                None => Ok(InstanceConfig {
                    mounts: self.mounts.clone(),
                }),
            }
        })
    }
}
