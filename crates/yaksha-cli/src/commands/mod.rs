pub mod clean;
pub mod record;
pub mod send;

use anyhow::{Context, Result};
use std::path::Path;
use yaksha_config::{Config, ConfigLoader};

/// Load yaksha.toml from `config_path` when given, else search upward from `dir`
pub fn load_config(dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let mut loader = ConfigLoader::new();
    match config_path {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => loader
            .load_from_directory(dir)
            .with_context(|| format!("Failed to load configuration for {}", dir.display())),
    }
}
