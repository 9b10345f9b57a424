// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TouchbridgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("error retrieving instance: {0}")]
    Instance(String),

    #[error("error retrieving instance config: {0}")]
    InstanceConfig(String),

    #[error("error retrieving mount path {path:?}: {reason}")]
    MountPath { path: PathBuf, reason: String },

    #[error("not running")]
    NotRunning,

    #[error("watcher channel closed")]
    ChannelClosed,

    #[error("guest command `{command}` failed ({status}): {stderr}")]
    GuestCommand {
        command: String,
        status: String,
        stderr: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TouchbridgeError>;
