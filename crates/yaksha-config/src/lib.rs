//! Yaksha Configuration System
//!
//! Provides configuration for the result recorder:
//! - Project configuration (yaksha.toml)
//! - Global user configuration (~/.yaksha/config.toml)
//! - Environment variable overrides (YAKSHA_*)
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.yaksha/config.toml)
//! 2. Project config (./yaksha.toml)
//! 3. Environment variables (YAKSHA_*)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use yaksha_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! let paths = config.paths();
//! println!("business lines go to {}", paths.business.display());
//! ```

pub mod global;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Missing required field '{field}' in {file}")]
    MissingField { field: String, file: PathBuf },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader, Paths, Remote};
pub use project::{KeyMode, MethodTypeMode, PathsConfig, ProjectConfig, RecordsConfig, RemoteConfig};
