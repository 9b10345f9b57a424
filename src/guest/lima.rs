// src/guest/lima.rs

//! `limactl shell` backed guest execution.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::trace;

use crate::errors::{Result, TouchbridgeError};
use crate::guest::GuestActions;
use crate::types::BoxFuture;

/// Runs guest commands via `limactl shell <instance> ...`.
#[derive(Debug, Clone)]
pub struct LimaGuest {
    limactl: String,
    instance: String,
}

impl LimaGuest {
    pub fn new(limactl: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            limactl: limactl.into(),
            instance: instance.into(),
        }
    }

    /// Build the host-side `limactl` invocation for a guest command.
    ///
    /// `--workdir /` keeps limactl from trying (and warning about) the
    /// host's current directory.
    fn command(&self, command: &str, args: &[&OsStr]) -> Command {
        let mut cmd = Command::new(&self.limactl);
        cmd.arg("shell")
            .arg("--workdir")
            .arg("/")
            .arg(&self.instance)
            .arg(command)
            .args(args)
            .kill_on_drop(true);
        cmd
    }
}

fn describe(command: &str, args: &[&OsStr]) -> String {
    std::iter::once(Cow::Borrowed(command))
        .chain(args.iter().map(|a| a.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn check_output(command: String, output: Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(TouchbridgeError::GuestCommand {
        command,
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

impl GuestActions for LimaGuest {
    fn run<'a>(&'a self, command: &'a str, args: &'a [&'a OsStr]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let description = describe(command, args);
            trace!(instance = %self.instance, command = %description, "running guest command");

            let status = self
                .command(command, args)
                .stdin(Stdio::null())
                .status()
                .await
                .with_context(|| format!("spawning `{}` for `{description}`", self.limactl))?;

            if status.success() {
                Ok(())
            } else {
                Err(TouchbridgeError::GuestCommand {
                    command: description,
                    status: status.to_string(),
                    stderr: String::new(),
                })
            }
        })
    }

    fn run_quiet<'a>(
        &'a self,
        command: &'a str,
        args: &'a [&'a OsStr],
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let description = describe(command, args);
            trace!(instance = %self.instance, command = %description, "running quiet guest command");

            let output = self
                .command(command, args)
                .stdin(Stdio::null())
                .output()
                .await
                .with_context(|| format!("spawning `{}` for `{description}`", self.limactl))?;

            check_output(description, output)
        })
    }

    fn write<'a>(&'a self, path: &'a Path, contents: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let description = format!("write {}", path.display());
            trace!(instance = %self.instance, path = %path.display(), bytes = contents.len(), "writing guest file");

            // `$0` keeps the path out of the shell script itself.
            let mut child = self
                .command(
                    "sh",
                    &[OsStr::new("-c"), OsStr::new("cat > \"$0\""), path.as_os_str()],
                )
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .with_context(|| format!("spawning `{}` for `{description}`", self.limactl))?;

            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(contents).await?;
                stdin.shutdown().await?;
            }

            let output = child.wait_with_output().await?;
            check_output(description, output)
        })
    }
}
