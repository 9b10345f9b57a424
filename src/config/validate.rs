// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TouchbridgeError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TouchbridgeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.instance, raw.watcher))
    }
}

impl ConfigFile {
    /// Replace the instance name (e.g. from `--instance`), applying the same
    /// check as the config file.
    pub fn with_instance_name(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_instance_name(&name)?;
        self.instance.name = name;
        Ok(self)
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_instance(cfg)?;
    validate_watcher(cfg)?;
    Ok(())
}

fn validate_instance(cfg: &RawConfigFile) -> Result<()> {
    validate_instance_name(&cfg.instance.name)?;
    if cfg.instance.limactl.trim().is_empty() {
        return Err(TouchbridgeError::ConfigError(
            "[instance].limactl must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_instance_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TouchbridgeError::ConfigError(
            "[instance].name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_watcher(cfg: &RawConfigFile) -> Result<()> {
    let w = &cfg.watcher;
    if w.batch_window_ms == 0 {
        return Err(TouchbridgeError::ConfigError(
            "[watcher].batch_window_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if w.max_batch == 0 {
        return Err(TouchbridgeError::ConfigError(
            "[watcher].max_batch must be >= 1 (got 0)".to_string(),
        ));
    }
    if w.readiness_interval_secs == 0 {
        return Err(TouchbridgeError::ConfigError(
            "[watcher].readiness_interval_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
