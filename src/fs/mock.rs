// src/fs/mock.rs

use super::{DirectoryEntry, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File,
    Dir(Vec<OsString>), // List of child names
    Symlink(PathBuf),
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    unreadable: HashSet<PathBuf>,
}

/// In-memory filesystem for traversal tests.
///
/// Paths are used verbatim (no normalisation), so tests should stick to
/// absolute paths like `/work/src`.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.add_dir("/");
        fs
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let exists = matches!(self.lock().entries.get(path), Some(MockEntry::Dir(_)));
        if !exists {
            self.insert(path, MockEntry::Dir(Vec::new()));
        }
    }

    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl Into<PathBuf>) {
        self.insert(path.as_ref(), MockEntry::Symlink(target.into()));
    }

    /// Make `read_dir` fail for `path` (e.g. permission denied).
    pub fn make_unreadable(&self, path: impl AsRef<Path>) {
        self.lock().unreadable.insert(path.as_ref().to_path_buf());
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut state = self.lock();
        state.entries.insert(path.to_path_buf(), entry);
        Self::link_to_parent(&mut state, path);
    }

    // Ensure parent directories exist implicitly and list `path` as a child.
    fn link_to_parent(state: &mut MockState, path: &Path) {
        let Some(parent) = path.parent() else {
            return;
        };
        let Some(name) = path.file_name() else {
            return;
        };

        if !matches!(state.entries.get(parent), Some(MockEntry::Dir(_))) {
            state
                .entries
                .insert(parent.to_path_buf(), MockEntry::Dir(Vec::new()));
            Self::link_to_parent(state, parent);
        }

        if let Some(MockEntry::Dir(children)) = state.entries.get_mut(parent) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_os_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::Symlink(target)) => Ok(target.clone()),
            Some(_) => Ok(path.to_path_buf()),
            None => Err(anyhow!("No such file or directory: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirectoryEntry>> {
        let state = self.lock();
        if state.unreadable.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => Ok(children
                .iter()
                .map(|name| {
                    let child = state.entries.get(&path.join(name));
                    DirectoryEntry {
                        name: name.clone(),
                        parent: path.to_path_buf(),
                        is_dir: matches!(child, Some(MockEntry::Dir(_))),
                        is_symlink: matches!(child, Some(MockEntry::Symlink(_))),
                    }
                })
                .collect()),
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
