// src/process/fsnotify.rs

//! Replays host file writes inside the guest.

use std::sync::{Arc, OnceLock};

use anyhow::anyhow;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::WatcherOptions;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::guest::GuestActions;
use crate::instance::InstanceSource;
use crate::process::{Dependency, Process};
use crate::types::BoxFuture;
use crate::watch::{
    register_roots, resolve_watch_roots, wait_for_instance, Aggregator, Liveness, NotifyBackend,
    Readiness, TouchDispatcher, WatchBackend, WatchRoot,
};

/// Name the process is registered under.
pub const NAME: &str = "fsnotify";

/// Watches the instance's mounts and touches modified files in the guest.
pub struct FsNotifyProcess {
    guest: Arc<dyn GuestActions>,
    instance: Arc<dyn InstanceSource>,
    fs: Arc<dyn FileSystem>,
    backend: Arc<dyn WatchBackend>,
    options: WatcherOptions,
    roots: OnceLock<Vec<WatchRoot>>,
    liveness: Liveness,
}

impl std::fmt::Debug for FsNotifyProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsNotifyProcess")
            .field("options", &self.options)
            .field("roots", &self.roots.get())
            .field("liveness", &self.liveness)
            .finish_non_exhaustive()
    }
}

impl FsNotifyProcess {
    pub fn new(
        guest: Arc<dyn GuestActions>,
        instance: Arc<dyn InstanceSource>,
        options: WatcherOptions,
    ) -> Self {
        Self {
            guest,
            instance,
            fs: Arc::new(RealFileSystem),
            backend: Arc::new(NotifyBackend),
            options,
            roots: OnceLock::new(),
            liveness: Liveness::new(),
        }
    }

    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_backend(mut self, backend: Arc<dyn WatchBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Watch roots resolved by `start`; empty before that.
    pub fn roots(&self) -> &[WatchRoot] {
        self.roots.get().map(Vec::as_slice).unwrap_or(&[])
    }

    async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let readiness =
            wait_for_instance(self.instance.as_ref(), self.options.readiness_interval, &cancel)
                .await;
        if readiness == Readiness::Cancelled {
            info!("cancelled while waiting for instance");
            return Ok(());
        }

        let roots = resolve_watch_roots(self.instance.as_ref(), self.fs.as_ref()).await?;
        if self.roots.set(roots.clone()).is_err() {
            warn!("watch roots were already resolved by an earlier start");
        }

        self.watch(roots, cancel).await
    }

    async fn watch(&self, roots: Vec<WatchRoot>, cancel: CancellationToken) -> Result<()> {
        let (mut registry, rx) = self.backend.open()?;

        let fs = Arc::clone(&self.fs);
        let walk_roots = roots.clone();
        let (registry, stats) = tokio::task::spawn_blocking(move || {
            let stats = register_roots(fs.as_ref(), registry.as_mut(), &walk_roots);
            (registry, stats)
        })
        .await
        .map_err(|e| anyhow!("directory registration task failed: {e}"))?;

        self.liveness.mark_alive();
        info!(
            roots = roots.len(),
            registered = stats.registered,
            failed = stats.failed,
            unreadable = stats.unreadable,
            skipped_hidden = stats.skipped_hidden,
            skipped_symlinks = stats.skipped_symlinks,
            "watching for file changes"
        );

        let dispatcher = TouchDispatcher::new(Arc::clone(&self.guest), self.options.max_batch);
        let result = Aggregator::new(rx, dispatcher, self.options.batch_window, roots)
            .run(cancel)
            .await;

        // Releases all watch handles, whichever way the loop ended.
        drop(registry);
        result
    }
}

impl Process for FsNotifyProcess {
    fn name(&self) -> &str {
        NAME
    }

    fn dependencies(&self) -> (Vec<Box<dyn Dependency>>, bool) {
        (Vec::new(), false)
    }

    fn alive(&self) -> Result<()> {
        self.liveness.check()
    }

    fn start(&self, cancel: CancellationToken) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.run(cancel))
    }
}
