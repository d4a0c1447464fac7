//! Clean command - remove the outputs of a previous run

use crate::commands::load_config;
use anyhow::Result;
use colored::*;
use std::path::{Path, PathBuf};
use yaksha_recorder::OutputFiles;

/// Run the clean command, returning the files removed
pub fn run(dir: &Path, config_path: Option<&Path>, quiet: bool) -> Result<Vec<PathBuf>> {
    let config = load_config(dir, config_path)?;
    let outputs = OutputFiles::resolve(dir, &config.paths());
    let removed = outputs.clear()?;

    if !quiet {
        if removed.is_empty() {
            println!("{}", "Nothing to clean.".dimmed());
        } else {
            for path in &removed {
                println!("{} {}", "Removed".green().bold(), path.display());
            }
        }
    }

    Ok(removed)
}
