// src/fs/mod.rs

use std::ffi::{OsStr, OsString};
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

pub mod mock;

/// Prefix marking a hidden file or directory.
pub const HIDDEN_PREFIX: &[u8] = b".";

/// True for names starting with [`HIDDEN_PREFIX`]. Works on the raw bytes so
/// names that are not valid UTF-8 are classified too.
pub fn is_hidden_name(name: &OsStr) -> bool {
    name.as_encoded_bytes().starts_with(HIDDEN_PREFIX)
}

/// A child entry of a directory, as seen during tree traversal.
///
/// `is_symlink` describes the entry itself (not its target); `is_dir` is only
/// true for real directories, so a symlink pointing at a directory has
/// `is_dir == false` and `is_symlink == true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: OsString,
    pub parent: PathBuf,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl DirectoryEntry {
    pub fn path(&self) -> PathBuf {
        self.parent.join(&self.name)
    }

    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.name)
    }
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Return the entries of a directory without following symlinks.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirectoryEntry>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("canonicalizing {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            // `DirEntry::file_type` does not traverse symlinks.
            if let Some(entry) = classify_entry(path, entry.file_name(), entry.file_type()) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

/// Build the entry for `name` inside `parent`, or `None` when its type could
/// not be read (e.g. it vanished mid-listing). Only that entry is lost.
pub fn classify_entry(
    parent: &Path,
    name: OsString,
    file_type: io::Result<fs::FileType>,
) -> Option<DirectoryEntry> {
    match file_type {
        Ok(file_type) => Some(DirectoryEntry {
            name,
            parent: parent.to_path_buf(),
            is_dir: file_type.is_dir(),
            is_symlink: file_type.is_symlink(),
        }),
        Err(err) => {
            warn!(
                path = %parent.join(&name).display(),
                error = %err,
                "skipping entry whose file type could not be read"
            );
            None
        }
    }
}
