// src/guest/mod.rs

//! Command execution inside the guest VM.
//!
//! The watcher only ever needs [`touch`], but the capability mirrors what the
//! rest of a VM manager would use (`run`, `run_quiet`, `write`), so other
//! background processes can share a single implementation.
//!
//! - [`GuestActions`] is the trait seam; tests provide a recording fake.
//! - [`lima::LimaGuest`] is the production implementation on top of
//!   `limactl shell`.

use std::ffi::OsStr;
use std::path::Path;

use crate::errors::Result;
use crate::types::BoxFuture;

pub mod lima;

pub use lima::LimaGuest;

/// Trait abstracting how commands are executed inside the guest.
pub trait GuestActions: Send + Sync {
    /// Run a command, streaming its output to ours.
    fn run<'a>(&'a self, command: &'a str, args: &'a [&'a OsStr]) -> BoxFuture<'a, Result<()>>;

    /// Run a command with its output suppressed. Output is only surfaced as
    /// part of the error when the command fails.
    fn run_quiet<'a>(
        &'a self,
        command: &'a str,
        args: &'a [&'a OsStr],
    ) -> BoxFuture<'a, Result<()>>;

    /// Write `contents` to `path` inside the guest, replacing the file.
    fn write<'a>(&'a self, path: &'a Path, contents: &'a [u8]) -> BoxFuture<'a, Result<()>>;
}

/// Update the mtime of `path` inside the guest.
///
/// The path is passed through byte for byte: host mounts appear at the same
/// location in the guest.
pub async fn touch(guest: &dyn GuestActions, path: &Path) -> Result<()> {
    guest.run_quiet("touch", &[path.as_os_str()]).await
}
