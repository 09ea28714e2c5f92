//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pollsys_utils::LogFormat;
use serde::{Deserialize, Serialize};

/// Settings for the `pollsys` CLI.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Snapshot file holding the ledger state.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("./pollsys.snapshot")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}
