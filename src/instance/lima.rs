// src/instance/lima.rs

//! Instance state via `limactl list --json` and `lima.yaml`.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, trace};

use crate::errors::{Result, TouchbridgeError};
use crate::instance::{InstanceConfig, InstanceSource, InstanceStatus};
use crate::types::BoxFuture;

/// File name of the instance configuration inside the instance directory.
pub const LIMA_YAML: &str = "lima.yaml";

#[derive(Debug, Clone)]
pub struct LimaInstance {
    limactl: String,
    name: String,
    lima_home: Option<PathBuf>,
}

impl LimaInstance {
    pub fn new(limactl: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            limactl: limactl.into(),
            name: name.into(),
            lima_home: None,
        }
    }

    pub fn with_lima_home(mut self, lima_home: Option<PathBuf>) -> Self {
        self.lima_home = lima_home;
        self
    }

    /// `$LIMA_HOME`, falling back to `~/.lima`.
    fn lima_home(&self) -> Result<PathBuf> {
        if let Some(home) = &self.lima_home {
            return Ok(home.clone());
        }
        if let Some(home) = std::env::var_os("LIMA_HOME") {
            return Ok(PathBuf::from(home));
        }
        dirs::home_dir()
            .map(|h| h.join(".lima"))
            .ok_or_else(|| {
                TouchbridgeError::InstanceConfig("home directory could not be determined".into())
            })
    }

    async fn list(&self) -> Result<InstanceStatus> {
        let output = Command::new(&self.limactl)
            .arg("list")
            .arg("--json")
            .arg(&self.name)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                TouchbridgeError::Instance(format!("running `{} list`: {e}", self.limactl))
            })?;

        if !output.status.success() {
            return Err(TouchbridgeError::Instance(format!(
                "`{} list` exited with {}: {}",
                self.limactl,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_list_output(&String::from_utf8_lossy(&output.stdout), &self.name)
    }

    async fn instance_dir(&self) -> Result<PathBuf> {
        match self.list().await {
            Ok(InstanceStatus { dir: Some(dir), .. }) => Ok(dir),
            Ok(_) => Ok(self.lima_home()?.join(&self.name)),
            Err(err) => {
                debug!(instance = %self.name, error = %err, "falling back to LIMA_HOME for instance dir");
                Ok(self.lima_home()?.join(&self.name))
            }
        }
    }
}

/// Find `name` among the JSON lines printed by `limactl list --json`.
pub fn parse_list_output(stdout: &str, name: &str) -> Result<InstanceStatus> {
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let status: InstanceStatus = serde_json::from_str(line).map_err(|e| {
            TouchbridgeError::Instance(format!("parsing `limactl list` output: {e}"))
        })?;
        if status.name == name {
            return Ok(status);
        }
    }
    Err(TouchbridgeError::Instance(format!(
        "instance '{name}' does not exist"
    )))
}

/// Parse the mounts out of a `lima.yaml` document.
pub fn parse_lima_yaml(contents: &str) -> Result<InstanceConfig> {
    serde_yaml::from_str(contents)
        .map_err(|e| TouchbridgeError::InstanceConfig(format!("parsing {LIMA_YAML}: {e}")))
}

impl InstanceSource for LimaInstance {
    fn current_instance(&self) -> BoxFuture<'_, Result<InstanceStatus>> {
        Box::pin(async move {
            let status = self.list().await?;
            trace!(instance = %status.name, status = %status.status, "queried instance");
            Ok(status)
        })
    }

    fn current_instance_config(&self) -> BoxFuture<'_, Result<InstanceConfig>> {
        Box::pin(async move {
            let path = self.instance_dir().await?.join(LIMA_YAML);
            let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
                TouchbridgeError::InstanceConfig(format!("reading {}: {e}", path.display()))
            })?;
            parse_lima_yaml(&contents)
        })
    }
}
