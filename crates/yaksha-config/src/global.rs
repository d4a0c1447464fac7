//! Global Configuration (~/.yaksha/config.toml)
//!
//! User-level defaults, typically the remote endpoint credential that should
//! not live in a project checkout.

use crate::project::{RecordsConfig, RemoteConfig};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.yaksha/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default record shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<RecordsConfig>,

    /// Default remote endpoint settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(records) = &self.records {
            records.validate()?;
        }
        if let Some(remote) = &self.remote {
            remote.validate()?;
        }
        Ok(())
    }

    /// Get the global config file path (~/.yaksha/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".yaksha").join("config.toml"))
    }

    /// Merge another global config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &GlobalConfig) {
        if other.records.is_some() {
            self.records = other.records.clone();
        }
        if other.remote.is_some() {
            self.remote = other.remote.clone();
        }
    }
}
