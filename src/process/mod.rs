// src/process/mod.rs

//! Background process contract and the fsnotify process itself.
//!
//! A supervisor (outside this crate) starts each [`Process`], polls
//! [`Process::alive`], and cancels them together on shutdown.

use crate::errors::Result;
use crate::types::BoxFuture;

use tokio_util::sync::CancellationToken;

pub mod fsnotify;

pub use fsnotify::FsNotifyProcess;

/// Something a process needs installed on the host before it can start.
pub trait Dependency: Send + Sync {
    fn name(&self) -> &str;
    fn installed(&self) -> bool;
}

/// A long-running background process managed by a supervisor.
pub trait Process: Send + Sync {
    fn name(&self) -> &str;

    /// Host dependencies, and whether the process needs root.
    fn dependencies(&self) -> (Vec<Box<dyn Dependency>>, bool);

    /// Non-blocking health check.
    fn alive(&self) -> Result<()>;

    /// Run until `cancel` fires (`Ok`) or a fatal error occurs.
    fn start(&self, cancel: CancellationToken) -> BoxFuture<'_, Result<()>>;
}
