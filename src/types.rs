// src/types.rs

//! Small shared types.

use std::future::Future;
use std::pin::Pin;

/// Boxed, `Send` future returned by the collaborator traits
/// (`GuestActions`, `InstanceSource`, `Process`).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
