//! Project Configuration (yaksha.toml)
//!
//! Handles project-level configuration stored in `yaksha.toml` next to the
//! test project that hosts the recorder.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default side-channel data file, relative to the working directory
pub const DEFAULT_CUSTOM_DATA: &str = "../../custom.ih";
/// Default output file for business-category lines
pub const DEFAULT_BUSINESS_FILE: &str = "output_revised.txt";
/// Default output file for boundary-category lines
pub const DEFAULT_BOUNDARY_FILE: &str = "output_boundary_revised.txt";
/// Default output file for exception-category lines
pub const DEFAULT_EXCEPTION_FILE: &str = "output_exception_revised.txt";
/// Default combined JSON-lines log
pub const DEFAULT_COMBINED_LOG: &str = "test.txt";
/// Default XML manifest
pub const DEFAULT_MANIFEST: &str = "yaksha-test-cases.xml";
/// Key used for every single-entry result mapping in constant key mode
pub const DEFAULT_RESULT_KEY: &str = "d907aa7b-3b6d-4940-8d09-28329ccbc070";
/// Grading endpoint that accepts result bundles
pub const DEFAULT_REMOTE_URL: &str =
    "https://yaksha-prod-sbfn.azurewebsites.net/api/YakshaMFAEnqueue";
/// Default remote request timeout in seconds
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

/// Project configuration from yaksha.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Input and output file locations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<PathsConfig>,

    /// Result record shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<RecordsConfig>,

    /// Remote grading endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

/// File locations, all relative to the recorder's working directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Side-channel data file echoed into every result bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<PathBuf>,

    /// Business category lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<PathBuf>,

    /// Boundary category lines (also the fallback category)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<PathBuf>,

    /// Exception category lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<PathBuf>,

    /// Combined JSON-lines log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_log: Option<PathBuf>,

    /// XML manifest written at the end of a run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
}

/// How the single-entry result mapping is keyed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// Every bundle uses the same configured result key
    #[default]
    Constant,
    /// Bundles are keyed by the test identifier
    Identifier,
}

/// What goes into the record's `methodType` field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MethodTypeMode {
    /// Always the literal "boundary"
    #[default]
    Fixed,
    /// The category derived from the title
    Derived,
}

/// Result record configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RecordsConfig {
    /// Key mode for the result mapping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyMode>,

    /// Key used in constant mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_key: Option<String>,

    /// Source of the `methodType` field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_type: Option<MethodTypeMode>,
}

/// Remote grading endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// Forward every recorded bundle to the endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Endpoint URL without query string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Credential passed as the `code` query parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProjectConfig {
    /// Load project configuration from a file
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

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(paths) = &self.paths {
            paths.validate()?;
        }
        if let Some(records) = &self.records {
            records.validate()?;
        }
        if let Some(remote) = &self.remote {
            remote.validate()?;
        }
        Ok(())
    }
}

impl PathsConfig {
    fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("paths.custom_data", &self.custom_data),
            ("paths.business", &self.business),
            ("paths.boundary", &self.boundary),
            ("paths.exception", &self.exception),
            ("paths.combined_log", &self.combined_log),
            ("paths.manifest", &self.manifest),
        ];
        for (field, value) in fields {
            if let Some(path) = value {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: field.to_string(),
                        reason: "path must not be empty".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Overlay another paths section; other takes precedence for set fields
    pub fn merge(&mut self, other: &PathsConfig) {
        merge_field(&mut self.custom_data, &other.custom_data);
        merge_field(&mut self.business, &other.business);
        merge_field(&mut self.boundary, &other.boundary);
        merge_field(&mut self.exception, &other.exception);
        merge_field(&mut self.combined_log, &other.combined_log);
        merge_field(&mut self.manifest, &other.manifest);
    }
}

impl RecordsConfig {
    pub(crate) fn validate(&self) -> ConfigResult<()> {
        if let Some(key) = &self.result_key {
            if key.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "records.result_key".to_string(),
                    reason: "result key must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Overlay another records section
    pub fn merge(&mut self, other: &RecordsConfig) {
        merge_field(&mut self.key, &other.key);
        merge_field(&mut self.result_key, &other.result_key);
        merge_field(&mut self.method_type, &other.method_type);
    }
}

impl RemoteConfig {
    pub(crate) fn validate(&self) -> ConfigResult<()> {
        if let Some(url) = &self.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: "remote.url".to_string(),
                    reason: format!("expected an http(s) URL, got '{}'", url),
                });
            }
            if url.contains('?') {
                return Err(ConfigError::InvalidValue {
                    field: "remote.url".to_string(),
                    reason: "query string belongs in remote.code".to_string(),
                });
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "remote.timeout_secs".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    /// Overlay another remote section
    pub fn merge(&mut self, other: &RemoteConfig) {
        merge_field(&mut self.enabled, &other.enabled);
        merge_field(&mut self.url, &other.url);
        merge_field(&mut self.code, &other.code);
        merge_field(&mut self.timeout_secs, &other.timeout_secs);
    }
}

fn merge_field<T: Clone>(base: &mut Option<T>, other: &Option<T>) {
    if other.is_some() {
        *base = other.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[paths]
custom_data = "data/custom.ih"
business = "out/business.txt"
boundary = "out/boundary.txt"
exception = "out/exception.txt"
combined_log = "out/test.txt"
manifest = "out/cases.xml"

[records]
key = "identifier"
result_key = "11111111-2222-3333-4444-555555555555"
method_type = "derived"

[remote]
enabled = true
url = "https://grader.example.com/api/enqueue"
code = "secret"
timeout_secs = 5
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());

        let records = config.records.unwrap();
        assert_eq!(records.key, Some(KeyMode::Identifier));
        assert_eq!(records.method_type, Some(MethodTypeMode::Derived));

        let paths = config.paths.unwrap();
        assert_eq!(paths.manifest, Some(PathBuf::from("out/cases.xml")));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
[paths]
functional = "output_functional_revised.txt"
"#;
        assert!(toml::from_str::<ProjectConfig>(toml).is_err());
    }

    #[test]
    fn test_unknown_key_mode_rejected() {
        let toml = r#"
[records]
key = "random"
"#;
        assert!(toml::from_str::<ProjectConfig>(toml).is_err());
    }

    #[test]
    fn test_url_with_query_rejected() {
        let config = ProjectConfig {
            remote: Some(RemoteConfig {
                url: Some("https://grader.example.com/api?code=abc".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "remote.url"
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let remote = RemoteConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(remote.validate().is_err());
    }

    #[test]
    fn test_empty_path_rejected() {
        let config = ProjectConfig {
            paths: Some(PathsConfig {
                business: Some(PathBuf::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_paths() {
        let mut base = PathsConfig {
            business: Some(PathBuf::from("a.txt")),
            boundary: Some(PathBuf::from("b.txt")),
            ..Default::default()
        };
        let other = PathsConfig {
            boundary: Some(PathBuf::from("c.txt")),
            ..Default::default()
        };
        base.merge(&other);
        assert_eq!(base.business, Some(PathBuf::from("a.txt")));
        assert_eq!(base.boundary, Some(PathBuf::from("c.txt")));
    }
}
