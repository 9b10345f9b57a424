use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::mpsc;
use touchbridge::errors::Result;
use touchbridge::watch::{Batch, Dispatch, Notification, NotificationRx, WatchBackend, WatchRegistry};

/// Dispatcher that stores every batch it is handed.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    batches: Arc<Mutex<Vec<Batch>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.batches.lock().unwrap().clone()
    }

    /// Paths of each batch, one `Vec` per dispatch call.
    pub fn batch_paths(&self) -> Vec<Vec<PathBuf>> {
        self.batches()
            .iter()
            .map(|b| b.paths().map(Path::to_path_buf).collect())
            .collect()
    }
}

impl Dispatch for RecordingDispatcher {
    fn dispatch(&self, batch: Batch) {
        self.batches.lock().unwrap().push(batch);
    }
}

/// Registry that records registrations; selected paths fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingRegistry {
    registered: Arc<Mutex<Vec<PathBuf>>>,
    failing: Arc<Mutex<HashSet<PathBuf>>>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, path: impl AsRef<Path>) {
        self.failing.lock().unwrap().insert(path.as_ref().to_path_buf());
    }

    /// Every path passed to `add`, including failed ones, in call order.
    pub fn registered(&self) -> Vec<PathBuf> {
        self.registered.lock().unwrap().clone()
    }
}

impl WatchRegistry for RecordingRegistry {
    fn add(&mut self, path: &Path) -> Result<()> {
        self.registered.lock().unwrap().push(path.to_path_buf());
        if self.failing.lock().unwrap().contains(path) {
            return Err(anyhow!("simulated watch failure for {:?}", path).into());
        }
        Ok(())
    }
}

/// Backend handing out a [`RecordingRegistry`] and a notification stream
/// whose sender stays with the test.
#[derive(Debug)]
pub struct FakeBackend {
    registry: RecordingRegistry,
    tx: Mutex<Option<mpsc::UnboundedSender<Notification>>>,
    rx: Mutex<Option<NotificationRx>>,
}

impl FakeBackend {
    pub fn new(registry: RecordingRegistry) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            registry,
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
        }
    }

    pub fn sender(&self) -> Option<mpsc::UnboundedSender<Notification>> {
        self.tx.lock().unwrap().clone()
    }

    /// Drop the backend's sender; once the test drops its clones as well,
    /// the stream is closed.
    pub fn close(&self) {
        self.tx.lock().unwrap().take();
    }
}

impl WatchBackend for FakeBackend {
    fn open(&self) -> Result<(Box<dyn WatchRegistry>, NotificationRx)> {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow!("fake backend opened twice"))?;
        Ok((Box::new(self.registry.clone()), rx))
    }
}
