// tests/process_lifecycle.rs

mod common;
use crate::common::{
    init_tracing, wait_until, write_event, FakeBackend, FakeGuest, FakeInstanceSource,
    RecordingRegistry,
};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use touchbridge::config::WatcherOptions;
use touchbridge::errors::{Result, TouchbridgeError};
use touchbridge::fs::mock::MockFileSystem;
use touchbridge::process::{FsNotifyProcess, Process};

struct Harness {
    process: Arc<FsNotifyProcess>,
    instance: FakeInstanceSource,
    guest: FakeGuest,
    registry: RecordingRegistry,
    backend: Arc<FakeBackend>,
    cancel: CancellationToken,
}

fn options() -> WatcherOptions {
    WatcherOptions {
        batch_window: Duration::from_millis(50),
        max_batch: 10,
        readiness_interval: Duration::from_millis(20),
    }
}

fn mounted_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_dir("/Users/me/app/src");
    fs.add_dir("/Users/me/app/.git/objects");
    fs.add_file("/Users/me/app/src/a.go");
    fs
}

fn harness(instance: FakeInstanceSource, fs: MockFileSystem) -> Harness {
    init_tracing();
    let guest = FakeGuest::new();
    let registry = RecordingRegistry::new();
    let backend = Arc::new(FakeBackend::new(registry.clone()));
    let process = FsNotifyProcess::new(Arc::new(guest.clone()), Arc::new(instance.clone()), options())
        .with_filesystem(Arc::new(fs))
        .with_backend(backend.clone());

    Harness {
        process: Arc::new(process),
        instance,
        guest,
        registry,
        backend,
        cancel: CancellationToken::new(),
    }
}

fn spawn_start(h: &Harness) -> JoinHandle<Result<()>> {
    let process = Arc::clone(&h.process);
    let cancel = h.cancel.clone();
    tokio::spawn(async move { process.start(cancel).await })
}

#[tokio::test]
async fn contract_metadata() {
    let h = harness(FakeInstanceSource::running(&["/Users/me/app"]), mounted_fs());

    assert_eq!(h.process.name(), "fsnotify");
    let (deps, root) = h.process.dependencies();
    assert!(deps.is_empty());
    assert!(!root);
}

#[tokio::test]
async fn alive_fails_before_start() {
    let h = harness(FakeInstanceSource::running(&["/Users/me/app"]), mounted_fs());

    assert!(matches!(h.process.alive(), Err(TouchbridgeError::NotRunning)));
    assert_eq!(h.process.alive().unwrap_err().to_string(), "not running");
}

#[tokio::test]
async fn waits_for_instance_before_traversing() {
    let h = harness(FakeInstanceSource::stopped(&["/Users/me/app"]), mounted_fs());
    let handle = spawn_start(&h);

    assert!(wait_until(|| h.instance.polls() >= 3).await);
    assert!(h.registry.registered().is_empty());
    assert_eq!(h.instance.config_calls(), 0);
    assert!(h.process.alive().is_err());

    h.instance.set_running(true);
    assert!(wait_until(|| h.process.alive().is_ok()).await);
    assert_eq!(
        h.registry.registered(),
        vec![PathBuf::from("/Users/me/app"), PathBuf::from("/Users/me/app/src")]
    );
    assert_eq!(h.process.roots().len(), 1);

    h.cancel.cancel();
    assert!(handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn write_events_become_guest_touches() {
    let h = harness(FakeInstanceSource::running(&["/Users/me/app"]), mounted_fs());
    let tx = h.backend.sender().unwrap();
    let handle = spawn_start(&h);

    assert!(wait_until(|| h.process.alive().is_ok()).await);
    tx.send(Ok(write_event("/Users/me/app/src/a.go"))).unwrap();

    assert!(wait_until(|| !h.guest.touched().is_empty()).await);
    assert_eq!(h.guest.touched(), vec![PathBuf::from("/Users/me/app/src/a.go")]);

    h.cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn closed_stream_fails_start_but_alive_stays_ok() {
    let h = harness(FakeInstanceSource::running(&["/Users/me/app"]), mounted_fs());
    let handle = spawn_start(&h);

    assert!(wait_until(|| h.process.alive().is_ok()).await);
    h.backend.close();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("start did not return")
        .unwrap();
    assert!(matches!(result, Err(TouchbridgeError::ChannelClosed)));
    assert!(h.process.alive().is_ok());
}

#[tokio::test]
async fn cancellation_while_waiting_returns_ok_without_traversal() {
    let h = harness(FakeInstanceSource::stopped(&["/Users/me/app"]), mounted_fs());
    let handle = spawn_start(&h);

    assert!(wait_until(|| h.instance.polls() >= 1).await);
    h.cancel.cancel();

    assert!(handle.await.unwrap().is_ok());
    assert!(h.registry.registered().is_empty());
    assert!(h.process.alive().is_err());
}

#[tokio::test]
async fn instance_config_failure_is_fatal() {
    let instance =
        FakeInstanceSource::running(&["/Users/me/app"]).with_config_error("lima.yaml missing");
    let h = harness(instance, mounted_fs());

    let result = spawn_start(&h).await.unwrap();
    assert!(matches!(result, Err(TouchbridgeError::InstanceConfig(_))));
    assert!(h.registry.registered().is_empty());
    assert!(h.process.alive().is_err());
}

#[tokio::test]
async fn unresolvable_mount_is_fatal() {
    let h = harness(
        FakeInstanceSource::running(&["/Users/me/app", "/does/not/exist"]),
        mounted_fs(),
    );

    let result = spawn_start(&h).await.unwrap();
    match result {
        Err(TouchbridgeError::MountPath { path, .. }) => {
            assert_eq!(path, PathBuf::from("/does/not/exist"));
        }
        other => panic!("expected MountPath error, got {other:?}"),
    }
    assert!(h.registry.registered().is_empty());
}
