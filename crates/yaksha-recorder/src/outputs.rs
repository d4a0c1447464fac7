//! Output file layout and the file operations the recorder performs on it

use crate::error::{RecorderError, RecorderResult};
use crate::title::Category;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use yaksha_config::Paths;

/// Every file a run reads or writes, resolved against the working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub custom_data: PathBuf,
    pub business: PathBuf,
    pub boundary: PathBuf,
    pub exception: PathBuf,
    pub combined_log: PathBuf,
    pub manifest: PathBuf,
}

impl OutputFiles {
    /// Resolve relative paths against `root`; absolute paths are kept
    pub fn resolve(root: &Path, paths: &Paths) -> Self {
        Self {
            custom_data: root.join(&paths.custom_data),
            business: root.join(&paths.business),
            boundary: root.join(&paths.boundary),
            exception: root.join(&paths.exception),
            combined_log: root.join(&paths.combined_log),
            manifest: root.join(&paths.manifest),
        }
    }

    pub fn category_file(&self, category: Category) -> &Path {
        match category {
            Category::Business => &self.business,
            Category::Boundary => &self.boundary,
            Category::Exception => &self.exception,
        }
    }

    /// Files produced by a run, in deletion order
    pub fn run_outputs(&self) -> [&Path; 5] {
        [
            self.business.as_path(),
            self.boundary.as_path(),
            self.exception.as_path(),
            self.manifest.as_path(),
            self.combined_log.as_path(),
        ]
    }

    /// Delete every run output that exists; returns the paths removed
    pub fn clear(&self) -> RecorderResult<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for path in self.run_outputs() {
            match fs::remove_file(path) {
                Ok(()) => {
                    info!("Cleared existing file: {}", path.display());
                    removed.push(path.to_path_buf());
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("Nothing to clear at {}", path.display());
                }
                Err(e) => return Err(RecorderError::io(path, e)),
            }
        }
        Ok(removed)
    }

    /// Read the side-channel data; a missing or unreadable file yields `None`
    pub fn read_custom_data(&self) -> Option<String> {
        match fs::read_to_string(&self.custom_data) {
            Ok(data) => {
                debug!(
                    "Loaded {} bytes of custom data from {}",
                    data.len(),
                    self.custom_data.display()
                );
                Some(data)
            }
            Err(e) => {
                error!(
                    "Error reading custom data from {}: {}",
                    self.custom_data.display(),
                    e
                );
                None
            }
        }
    }
}

/// Append `line` plus a newline, creating the file and its parent directory
pub fn append_line(path: &Path, line: &str) -> RecorderResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| RecorderError::io(parent, e))?;
        }
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| RecorderError::io(path, e))?;
    writeln!(file, "{}", line).map_err(|e| RecorderError::io(path, e))
}
