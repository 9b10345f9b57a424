// src/watch/liveness.rs

use std::sync::{Mutex, PoisonError};

use crate::errors::{Result, TouchbridgeError};

/// Whether the watcher has finished registering its directories.
///
/// Flips from `false` to `true` once and never back. Readers and the writer
/// go through the same mutex.
#[derive(Debug, Default)]
pub struct Liveness {
    alive: Mutex<bool>,
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_alive(&self) {
        *self.alive.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    pub fn is_alive(&self) -> bool {
        *self.alive.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `Ok` once alive, [`TouchbridgeError::NotRunning`] before.
    pub fn check(&self) -> Result<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(TouchbridgeError::NotRunning)
        }
    }
}
