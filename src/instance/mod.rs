// src/instance/mod.rs

//! Guest instance state and mount configuration.
//!
//! - [`InstanceSource`] answers "is the VM running?" and "what is mounted?".
//! - [`lima::LimaInstance`] implements it on top of `limactl list --json` and
//!   the instance's `lima.yaml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{Result, TouchbridgeError};
use crate::fs::FileSystem;
use crate::types::BoxFuture;

pub mod lima;

pub use lima::LimaInstance;

/// Status string reported by Lima for a running instance.
pub const STATUS_RUNNING: &str = "Running";

/// Trait abstracting where instance state and mounts come from.
pub trait InstanceSource: Send + Sync {
    fn current_instance(&self) -> BoxFuture<'_, Result<InstanceStatus>>;

    fn current_instance_config(&self) -> BoxFuture<'_, Result<InstanceConfig>>;
}

/// One entry of `limactl list --json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstanceStatus {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl InstanceStatus {
    pub fn running(&self) -> bool {
        self.status == STATUS_RUNNING
    }
}

/// The subset of `lima.yaml` the watcher cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstanceConfig {
    #[serde(default)]
    pub mounts: Vec<Mount>,
}

impl InstanceConfig {
    /// The configured mounts, or the home directory when none are declared.
    pub fn mounts_or_default(&self) -> Vec<Mount> {
        if self.mounts.is_empty() {
            vec![Mount {
                location: "~".to_string(),
                writable: true,
            }]
        } else {
            self.mounts.clone()
        }
    }
}

/// A host directory shared with the guest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Mount {
    pub location: String,
    #[serde(default)]
    pub writable: bool,
}

impl Mount {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            writable: false,
        }
    }

    /// Expand `~` and canonicalize the mount location.
    pub fn clean_path(&self, fs: &dyn FileSystem) -> Result<PathBuf> {
        let expanded = expand_home(&self.location)?;
        fs.canonicalize(&expanded)
            .map_err(|err| TouchbridgeError::MountPath {
                path: expanded.clone(),
                reason: format!("{err:#}"),
            })
    }
}

/// Expand a leading `~` (alone or followed by `/`) to the home directory.
pub fn expand_home(location: &str) -> Result<PathBuf> {
    let rest = match location.strip_prefix('~') {
        None => return Ok(PathBuf::from(location)),
        Some(rest) if rest.is_empty() => "",
        Some(rest) => match rest.strip_prefix('/') {
            Some(rest) => rest,
            // `~user` is not supported by lima either.
            None => return Ok(PathBuf::from(location)),
        },
    };

    let home = dirs::home_dir().ok_or_else(|| TouchbridgeError::MountPath {
        path: PathBuf::from(location),
        reason: "home directory could not be determined".to_string(),
    })?;

    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(Path::new(rest)))
    }
}
