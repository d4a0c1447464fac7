//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{
    KeyMode, MethodTypeMode, PathsConfig, ProjectConfig, RecordsConfig, RemoteConfig,
    DEFAULT_BOUNDARY_FILE, DEFAULT_BUSINESS_FILE, DEFAULT_COMBINED_LOG, DEFAULT_CUSTOM_DATA,
    DEFAULT_EXCEPTION_FILE, DEFAULT_MANIFEST, DEFAULT_REMOTE_TIMEOUT_SECS, DEFAULT_REMOTE_URL,
    DEFAULT_RESULT_KEY,
};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "yaksha.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.yaksha/config.toml) - lowest priority
/// 2. Project config (./yaksha.toml) - overrides global
/// 3. Environment variables (YAKSHA_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where yaksha.toml was found)
    pub project_root: Option<PathBuf>,
}

/// Fully resolved file locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub custom_data: PathBuf,
    pub business: PathBuf,
    pub boundary: PathBuf,
    pub exception: PathBuf,
    pub combined_log: PathBuf,
    pub manifest: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            custom_data: PathBuf::from(DEFAULT_CUSTOM_DATA),
            business: PathBuf::from(DEFAULT_BUSINESS_FILE),
            boundary: PathBuf::from(DEFAULT_BOUNDARY_FILE),
            exception: PathBuf::from(DEFAULT_EXCEPTION_FILE),
            combined_log: PathBuf::from(DEFAULT_COMBINED_LOG),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
        }
    }
}

/// Fully resolved remote endpoint settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub enabled: bool,
    pub url: String,
    pub code: Option<String>,
    pub timeout: Duration,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use a specific global config file instead of ~/.yaksha/config.toml
    pub fn with_global_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find yaksha.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;

        // Global config is best-effort
        let global_config = self.load_global_config().unwrap_or_default();

        let project_config = self.apply_env_overrides(project_config)?;

        let config = Config {
            project: project_config,
            global: global_config,
            project_root,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config().unwrap_or_default();
        let project_config = self.apply_env_overrides(project_config)?;

        let project_root = config_path.parent().map(|p| p.to_path_buf());

        let config = Config {
            project: project_config,
            global: global_config,
            project_root,
        };
        config.validate()?;
        Ok(config)
    }

    /// Find project configuration by walking up directory tree
    ///
    /// Returns (project_root, project_config); a missing file yields defaults
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration from ~/.yaksha/config.toml
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = GlobalConfig::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    /// Apply environment variable overrides to project config
    ///
    /// Recognised variables: YAKSHA_CUSTOM_DATA, YAKSHA_RECORD_KEY,
    /// YAKSHA_REMOTE_ENABLED, YAKSHA_REMOTE_URL, YAKSHA_REMOTE_CODE
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(custom_data) = env::var("YAKSHA_CUSTOM_DATA") {
            config
                .paths
                .get_or_insert_with(PathsConfig::default)
                .custom_data = Some(PathBuf::from(custom_data));
        }

        if let Ok(key) = env::var("YAKSHA_RECORD_KEY") {
            let mode = match key.to_lowercase().as_str() {
                "constant" => KeyMode::Constant,
                "identifier" => KeyMode::Identifier,
                other => {
                    return Err(ConfigError::InvalidValue {
                        field: "YAKSHA_RECORD_KEY".to_string(),
                        reason: format!("must be 'constant' or 'identifier', got '{}'", other),
                    })
                }
            };
            config
                .records
                .get_or_insert_with(RecordsConfig::default)
                .key = Some(mode);
        }

        if let Ok(enabled) = env::var("YAKSHA_REMOTE_ENABLED") {
            let enabled = matches!(enabled.to_lowercase().as_str(), "true" | "1" | "yes");
            config
                .remote
                .get_or_insert_with(RemoteConfig::default)
                .enabled = Some(enabled);
        }

        if let Ok(url) = env::var("YAKSHA_REMOTE_URL") {
            config.remote.get_or_insert_with(RemoteConfig::default).url = Some(url);
        }

        if let Ok(code) = env::var("YAKSHA_REMOTE_CODE") {
            config.remote.get_or_insert_with(RemoteConfig::default).code = Some(code);
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Validate settings that only make sense after merging
    pub fn validate(&self) -> ConfigResult<()> {
        let remote = self.remote();
        if remote.enabled && remote.code.is_none() {
            let file = self
                .project_root
                .as_ref()
                .map(|root| root.join(PROJECT_CONFIG_FILE))
                .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
            return Err(ConfigError::MissingField {
                field: "remote.code".to_string(),
                file,
            });
        }
        Ok(())
    }

    /// Resolved file locations (project > defaults)
    pub fn paths(&self) -> Paths {
        let defaults = Paths::default();
        let Some(paths) = &self.project.paths else {
            return defaults;
        };
        Paths {
            custom_data: paths.custom_data.clone().unwrap_or(defaults.custom_data),
            business: paths.business.clone().unwrap_or(defaults.business),
            boundary: paths.boundary.clone().unwrap_or(defaults.boundary),
            exception: paths.exception.clone().unwrap_or(defaults.exception),
            combined_log: paths.combined_log.clone().unwrap_or(defaults.combined_log),
            manifest: paths.manifest.clone().unwrap_or(defaults.manifest),
        }
    }

    fn records(&self) -> RecordsConfig {
        let mut records = self.global.records.clone().unwrap_or_default();
        if let Some(project) = &self.project.records {
            records.merge(project);
        }
        records
    }

    /// Effective key mode (project > global > constant)
    pub fn key_mode(&self) -> KeyMode {
        self.records().key.unwrap_or_default()
    }

    /// Effective result key used in constant mode
    pub fn result_key(&self) -> String {
        self.records()
            .result_key
            .unwrap_or_else(|| DEFAULT_RESULT_KEY.to_string())
    }

    /// Effective `methodType` source
    pub fn method_type(&self) -> MethodTypeMode {
        self.records().method_type.unwrap_or_default()
    }

    /// Effective remote endpoint settings (project > global > defaults)
    pub fn remote(&self) -> Remote {
        let mut remote = self.global.remote.clone().unwrap_or_default();
        if let Some(project) = &self.project.remote {
            remote.merge(project);
        }
        Remote {
            enabled: remote.enabled.unwrap_or(false),
            url: remote.url.unwrap_or_else(|| DEFAULT_REMOTE_URL.to_string()),
            code: remote.code,
            timeout: Duration::from_secs(remote.timeout_secs.unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS)),
        }
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a yaksha.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(PROJECT_CONFIG_FILE);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    fn loader(home: &TempDir) -> ConfigLoader {
        ConfigLoader::new().with_global_config_path(home.path().join("config.toml"))
    }

    #[test]
    #[serial]
    fn test_defaults_without_project() {
        let temp_dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let config = loader(&home).load_from_directory(temp_dir.path()).unwrap();

        assert!(!config.is_project());
        assert_eq!(config.paths(), Paths::default());
        assert_eq!(config.key_mode(), KeyMode::Constant);
        assert_eq!(config.result_key(), DEFAULT_RESULT_KEY);
        assert!(!config.remote().enabled);
    }

    #[test]
    #[serial]
    fn test_find_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[paths]
manifest = "cases.xml"
"#,
        );

        let sub_dir = temp_dir.path().join("cypress");
        fs::create_dir(&sub_dir).unwrap();

        let config = loader(&home).load_from_directory(&sub_dir).unwrap();

        assert_eq!(config.project_root(), Some(temp_dir.path()));
        assert_eq!(config.paths().manifest, PathBuf::from("cases.xml"));
        assert_eq!(config.paths().business, PathBuf::from(DEFAULT_BUSINESS_FILE));
    }

    #[test]
    #[serial]
    fn test_global_remote_code_merges_under_project() {
        let temp_dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        fs::write(
            home.path().join("config.toml"),
            r#"
[remote]
code = "home-code"
timeout_secs = 3
"#,
        )
        .unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[remote]
enabled = true
timeout_secs = 7
"#,
        );

        let config = loader(&home).load_from_directory(temp_dir.path()).unwrap();
        let remote = config.remote();

        assert!(remote.enabled);
        assert_eq!(remote.code.as_deref(), Some("home-code"));
        assert_eq!(remote.timeout, Duration::from_secs(7));
        assert_eq!(remote.url, DEFAULT_REMOTE_URL);
    }

    #[test]
    #[serial]
    fn test_enabled_remote_requires_code() {
        let temp_dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[remote]
enabled = true
"#,
        );

        let result = loader(&home).load_from_directory(temp_dir.path());
        assert!(matches!(
            result,
            Err(ConfigError::MissingField { field, .. }) if field == "remote.code"
        ));
    }

    #[test]
    #[serial]
    fn test_env_override_custom_data() {
        let temp_dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        env::set_var("YAKSHA_CUSTOM_DATA", "side/custom.ih");
        let config = loader(&home).load_from_directory(temp_dir.path()).unwrap();
        env::remove_var("YAKSHA_CUSTOM_DATA");

        assert_eq!(config.paths().custom_data, PathBuf::from("side/custom.ih"));
    }

    #[test]
    #[serial]
    fn test_env_override_record_key() {
        let temp_dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        env::set_var("YAKSHA_RECORD_KEY", "Identifier");
        let config = loader(&home).load_from_directory(temp_dir.path()).unwrap();
        env::remove_var("YAKSHA_RECORD_KEY");

        assert_eq!(config.key_mode(), KeyMode::Identifier);
    }

    #[test]
    #[serial]
    fn test_env_invalid_record_key() {
        let temp_dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        env::set_var("YAKSHA_RECORD_KEY", "guid");
        let result = loader(&home).load_from_directory(temp_dir.path());
        env::remove_var("YAKSHA_RECORD_KEY");

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    #[serial]
    fn test_env_enables_remote() {
        let temp_dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        env::set_var("YAKSHA_REMOTE_ENABLED", "yes");
        env::set_var("YAKSHA_REMOTE_CODE", "env-code");
        let config = loader(&home).load_from_directory(temp_dir.path()).unwrap();
        env::remove_var("YAKSHA_REMOTE_ENABLED");
        env::remove_var("YAKSHA_REMOTE_CODE");

        let remote = config.remote();
        assert!(remote.enabled);
        assert_eq!(remote.code.as_deref(), Some("env-code"));
    }

    #[test]
    #[serial]
    fn test_load_from_specific_file() {
        let temp_dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let config_path = create_config_file(
            temp_dir.path(),
            r#"
[records]
method_type = "derived"
"#,
        );

        let config = loader(&home).load_from_file(&config_path).unwrap();

        assert_eq!(config.method_type(), MethodTypeMode::Derived);
        assert_eq!(config.project_root(), Some(temp_dir.path()));
    }
}
