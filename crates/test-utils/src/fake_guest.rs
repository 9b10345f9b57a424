use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use touchbridge::errors::{Result, TouchbridgeError};
use touchbridge::guest::GuestActions;
use touchbridge::types::BoxFuture;

/// A guest command as seen by [`FakeGuest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestCall {
    Run { command: String, args: Vec<OsString> },
    RunQuiet { command: String, args: Vec<OsString> },
    Write { path: PathBuf, contents: Vec<u8> },
}

/// A guest that records every call instead of running anything.
///
/// Quiet commands whose arguments include a path registered with
/// [`FakeGuest::fail_on`] return an error (after being recorded).
#[derive(Debug, Clone, Default)]
pub struct FakeGuest {
    calls: Arc<Mutex<Vec<GuestCall>>>,
    failing: Arc<Mutex<HashSet<OsString>>>,
}

impl FakeGuest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, arg: impl AsRef<Path>) {
        self.failing
            .lock()
            .unwrap()
            .insert(arg.as_ref().as_os_str().to_os_string());
    }

    pub fn calls(&self) -> Vec<GuestCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Paths passed to `touch`, in call order.
    pub fn touched(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GuestCall::RunQuiet { command, mut args } if command == "touch" => {
                    args.pop().map(PathBuf::from)
                }
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: GuestCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn owned(args: &[&OsStr]) -> Vec<OsString> {
    args.iter().map(|a| a.to_os_string()).collect()
}

impl GuestActions for FakeGuest {
    fn run<'a>(&'a self, command: &'a str, args: &'a [&'a OsStr]) -> BoxFuture<'a, Result<()>> {
        self.record(GuestCall::Run {
            command: command.to_string(),
            args: owned(args),
        });
        Box::pin(async { Ok(()) })
    }

    fn run_quiet<'a>(
        &'a self,
        command: &'a str,
        args: &'a [&'a OsStr],
    ) -> BoxFuture<'a, Result<()>> {
        self.record(GuestCall::RunQuiet {
            command: command.to_string(),
            args: owned(args),
        });
        let fail = {
            let failing = self.failing.lock().unwrap();
            args.iter().any(|a| failing.contains(*a))
        };
        Box::pin(async move {
            if fail {
                Err(TouchbridgeError::GuestCommand {
                    command: command.to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "simulated failure".to_string(),
                })
            } else {
                Ok(())
            }
        })
    }

    fn write<'a>(&'a self, path: &'a Path, contents: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        self.record(GuestCall::Write {
            path: path.to_path_buf(),
            contents: contents.to_vec(),
        });
        Box::pin(async { Ok(()) })
    }
}
