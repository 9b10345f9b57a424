// src/config/mod.rs

//! Configuration loading (TOML) and validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_or_default, parse_str};
pub use model::{ConfigFile, InstanceSection, RawConfigFile, WatcherOptions, WatcherSection};
