// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [instance]
/// name = "colima"
/// limactl = "limactl"
///
/// [watcher]
/// batch_window_ms = 1000
/// max_batch = 10
/// readiness_interval_secs = 5
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub instance: InstanceSection,

    #[serde(default)]
    pub watcher: WatcherSection,
}

/// `[instance]` section: which Lima instance to talk to.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceSection {
    #[serde(default = "default_instance_name")]
    pub name: String,

    /// The `limactl` binary, either a bare name resolved via `PATH` or a path.
    #[serde(default = "default_limactl")]
    pub limactl: String,

    /// Overrides `$LIMA_HOME` / `~/.lima` when locating instance directories.
    #[serde(default)]
    pub lima_home: Option<PathBuf>,
}

fn default_instance_name() -> String {
    "colima".to_string()
}

fn default_limactl() -> String {
    "limactl".to_string()
}

impl Default for InstanceSection {
    fn default() -> Self {
        Self {
            name: default_instance_name(),
            limactl: default_limactl(),
            lima_home: None,
        }
    }
}

/// `[watcher]` section: aggregation and readiness timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatcherSection {
    #[serde(default = "default_batch_window_ms")]
    pub batch_window_ms: u64,

    #[serde(default = "default_max_batch")]
    pub max_batch: usize,

    #[serde(default = "default_readiness_interval_secs")]
    pub readiness_interval_secs: u64,
}

fn default_batch_window_ms() -> u64 {
    1000
}

fn default_max_batch() -> usize {
    10
}

fn default_readiness_interval_secs() -> u64 {
    5
}

impl Default for WatcherSection {
    fn default() -> Self {
        Self {
            batch_window_ms: default_batch_window_ms(),
            max_batch: default_max_batch(),
            readiness_interval_secs: default_readiness_interval_secs(),
        }
    }
}

/// Timing knobs consumed by the watcher itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherOptions {
    /// Length of one aggregation window.
    pub batch_window: Duration,
    /// Maximum number of events touched per window; the rest is discarded.
    pub max_batch: usize,
    /// Interval between instance readiness polls.
    pub readiness_interval: Duration,
}

impl Default for WatcherOptions {
    fn default() -> Self {
        Self {
            batch_window: Duration::from_secs(1),
            max_batch: 10,
            readiness_interval: Duration::from_secs(5),
        }
    }
}

/// Validated configuration.
///
/// Construct via `ConfigFile::try_from(raw)` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub instance: InstanceSection,
    pub watcher: WatcherSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(instance: InstanceSection, watcher: WatcherSection) -> Self {
        Self { instance, watcher }
    }

    pub fn watcher_options(&self) -> WatcherOptions {
        WatcherOptions {
            batch_window: Duration::from_millis(self.watcher.batch_window_ms),
            max_batch: self.watcher.max_batch,
            readiness_interval: Duration::from_secs(self.watcher.readiness_interval_secs),
        }
    }
}
