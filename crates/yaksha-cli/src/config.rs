//! CLI configuration via environment variables
//!
//! Output preferences that apply to every subcommand. Recorder settings
//! live in yaksha.toml and are handled by `yaksha-config`.

use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Default to JSON summaries (YAKSHA_JSON=1)
    pub default_json: bool,
    /// Disable colored output (YAKSHA_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            default_json: env::var("YAKSHA_JSON")
                .map(|v| {
                    let lower = v.to_lowercase();
                    lower == "1" || lower == "true" || lower == "json"
                })
                .unwrap_or(false),
            no_color: env::var("YAKSHA_NO_COLOR").is_ok() || env::var("NO_COLOR").is_ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
