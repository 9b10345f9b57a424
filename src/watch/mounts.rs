// src/watch/mounts.rs

//! Turning the instance's mounts into watch roots.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, TouchbridgeError};
use crate::fs::FileSystem;
use crate::instance::InstanceSource;

/// A canonical, absolute host directory at the top of a watched subtree.
///
/// Trailing separators are stripped so paths re-match exactly against the
/// paths reported by the watch backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchRoot(PathBuf);

impl WatchRoot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        // Rebuilding from components drops trailing separators but keeps `/`.
        Self(path.as_ref().components().collect())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for WatchRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for WatchRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Fetch the instance's mounts and canonicalize each into a [`WatchRoot`].
///
/// Any failure is fatal: watching an incomplete set of roots would go
/// unnoticed.
pub async fn resolve_watch_roots(
    source: &dyn InstanceSource,
    fs: &dyn FileSystem,
) -> Result<Vec<WatchRoot>> {
    let config = source.current_instance_config().await.map_err(|err| match err {
        TouchbridgeError::InstanceConfig(_) => err,
        other => TouchbridgeError::InstanceConfig(other.to_string()),
    })?;

    config
        .mounts_or_default()
        .iter()
        .map(|mount| {
            let path = mount.clean_path(fs)?;
            debug!(location = %mount.location, path = %path.display(), "resolved mount");
            Ok(WatchRoot::new(path))
        })
        .collect()
}
