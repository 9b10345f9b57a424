// src/watch/tree.rs

//! Recursive registration of watch roots.
//!
//! Every directory below a root is registered individually (non-recursive
//! watches), except hidden directories and symlinks, whose subtrees are
//! skipped entirely. Failures are per directory: an unreadable directory
//! counts as having no children, a failed registration is logged, and the
//! walk carries on either way.

use std::ops::AddAssign;
use std::path::Path;

use tracing::{error, trace, warn};

use crate::errors::Result;
use crate::fs::{is_hidden_name, DirectoryEntry, FileSystem};
use crate::watch::mounts::WatchRoot;

/// The low-level watch primitive: register one directory.
pub trait WatchRegistry: Send {
    fn add(&mut self, path: &Path) -> Result<()>;
}

/// What to do with a child entry during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDecision {
    Descend,
    SkipHidden,
    SkipSymlink,
    NotADirectory,
}

/// Decide about a child entry. Link-ness is checked before anything else so
/// symlinked directories are never followed.
pub fn decide(entry: &DirectoryEntry) -> EntryDecision {
    if entry.is_symlink {
        EntryDecision::SkipSymlink
    } else if !entry.is_dir {
        EntryDecision::NotADirectory
    } else if entry.is_hidden() {
        EntryDecision::SkipHidden
    } else {
        EntryDecision::Descend
    }
}

/// Counters for one or more traversals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub registered: usize,
    pub failed: usize,
    pub unreadable: usize,
    pub skipped_hidden: usize,
    pub skipped_symlinks: usize,
}

impl AddAssign for TreeStats {
    fn add_assign(&mut self, rhs: Self) {
        self.registered += rhs.registered;
        self.failed += rhs.failed;
        self.unreadable += rhs.unreadable;
        self.skipped_hidden += rhs.skipped_hidden;
        self.skipped_symlinks += rhs.skipped_symlinks;
    }
}

/// Register `root` and every eligible directory below it, depth first.
pub fn register_tree(
    fs: &dyn FileSystem,
    registry: &mut dyn WatchRegistry,
    root: &WatchRoot,
) -> TreeStats {
    let mut stats = TreeStats::default();
    let mut pending = vec![root.as_path().to_path_buf()];

    while let Some(dir) = pending.pop() {
        // Register before listing: the root is registered even if its
        // children can't be read.
        match registry.add(&dir) {
            Ok(()) => {
                stats.registered += 1;
                trace!(path = %dir.display(), "added to watch directories");
            }
            Err(err) => {
                stats.failed += 1;
                warn!(path = %dir.display(), error = %err, "error adding to watch directories");
            }
        }

        let children = match fs.read_dir(&dir) {
            Ok(children) => children,
            Err(err) => {
                stats.unreadable += 1;
                error!(path = %dir.display(), error = %format!("{err:#}"), "error retrieving dirlist");
                continue;
            }
        };

        // Reverse so the stack pops children in listing order.
        for entry in children.into_iter().rev() {
            match decide(&entry) {
                EntryDecision::Descend => pending.push(entry.path()),
                EntryDecision::SkipHidden => {
                    stats.skipped_hidden += 1;
                    trace!(name = ?entry.name, parent = %entry.parent.display(), "skipping hidden child directory");
                }
                EntryDecision::SkipSymlink => {
                    stats.skipped_symlinks += 1;
                    trace!(name = ?entry.name, parent = %entry.parent.display(), "skipping symlink");
                }
                EntryDecision::NotADirectory => {}
            }
        }
    }

    stats
}

/// Register every root in order and return the combined counters.
pub fn register_roots(
    fs: &dyn FileSystem,
    registry: &mut dyn WatchRegistry,
    roots: &[WatchRoot],
) -> TreeStats {
    let mut total = TreeStats::default();
    for root in roots {
        total += register_tree(fs, registry, root);
    }
    total
}

/// True when `path` sits below a hidden directory of the closest enclosing
/// root. Hidden files directly inside watched directories are not affected.
pub fn is_below_hidden_dir(roots: &[WatchRoot], path: &Path) -> bool {
    let Some(relative) = roots
        .iter()
        .filter_map(|root| path.strip_prefix(root.as_path()).ok())
        .min_by_key(|rel| rel.components().count())
    else {
        return false;
    };

    relative
        .parent()
        .map(|dirs| dirs.components().any(|c| is_hidden_name(c.as_os_str())))
        .unwrap_or(false)
}
