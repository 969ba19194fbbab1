//! Configuration management for flightlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "flightlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "flights.db";

/// Default reference airports file name.
const AIRPORTS_FILE_NAME: &str = "airports.db";

/// Default last-access log file name.
const LAST_ACCESS_FILE_NAME: &str = "last_access.json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLIGHTLOG_`, sections split on
///    `__`, e.g. `FLIGHTLOG_STORAGE__DATABASE_PATH`)
/// 2. TOML config file at `~/.config/flightlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Reference data configuration.
    pub reference: ReferenceConfig,
    /// Last-access log configuration.
    pub session: SessionConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the flight log database.
    /// Defaults to `~/.local/share/flightlog/flights.db`
    pub database_path: Option<PathBuf>,
}

/// Reference airport data configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Path to the airports database.
    /// Defaults to `~/.local/share/flightlog/airports.db`
    pub airports_path: Option<PathBuf>,
}

/// Last-access log configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Record the time of each run.
    pub enabled: bool,
    /// Path to the last-access log.
    /// Defaults to `~/.local/share/flightlog/last_access.json`
    pub last_access_path: Option<PathBuf>,
}

/// Export configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for exports written without an explicit path.
    /// Defaults to the current directory.
    pub directory: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            last_access_path: None, // Will be resolved to default at runtime
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `FLIGHTLOG_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("FLIGHTLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured path is empty.
    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("storage.database_path", &self.storage.database_path),
            ("reference.airports_path", &self.reference.airports_path),
            ("session.last_access_path", &self.session.last_access_path),
            ("export.directory", &self.export.directory),
        ];

        for (name, path) in paths {
            if path.as_deref().is_some_and(|p| p.as_os_str().is_empty()) {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must not be empty"),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the airports path, resolving defaults if not set.
    #[must_use]
    pub fn airports_path(&self) -> PathBuf {
        self.reference
            .airports_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(AIRPORTS_FILE_NAME))
    }

    /// Get the last-access log path, resolving defaults if not set.
    #[must_use]
    pub fn last_access_path(&self) -> PathBuf {
        self.session
            .last_access_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(LAST_ACCESS_FILE_NAME))
    }

    /// Resolve an export file name against the export directory.
    ///
    /// Absolute paths are returned unchanged.
    #[must_use]
    pub fn export_path(&self, file: &Path) -> PathBuf {
        match &self.export.directory {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.reference.airports_path.is_none());
        assert!(config.session.enabled);
        assert!(config.export.directory.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::new());

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("storage.database_path"));
    }

    #[test]
    fn test_validate_empty_export_directory() {
        let mut config = Config::default();
        config.export.directory = Some(PathBuf::new());

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("flights.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/flights.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/flights.sqlite")
        );
    }

    #[test]
    fn test_airports_path_default() {
        let config = Config::default();
        assert!(config.airports_path().to_string_lossy().contains("airports.db"));
    }

    #[test]
    fn test_last_access_path_default() {
        let config = Config::default();
        assert!(config
            .last_access_path()
            .to_string_lossy()
            .contains("last_access.json"));
    }

    #[test]
    fn test_export_path() {
        let mut config = Config::default();
        assert_eq!(
            config.export_path(Path::new("flights.json")),
            PathBuf::from("flights.json")
        );

        config.export.directory = Some(PathBuf::from("/exports"));
        assert_eq!(
            config.export_path(Path::new("flights.json")),
            PathBuf::from("/exports/flights.json")
        );
        assert_eq!(
            config.export_path(Path::new("/tmp/out.json")),
            PathBuf::from("/tmp/out.json")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("flightlog"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("flightlog"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "flightlog_config_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[storage]\ndatabase_path = \"/data/log.db\"\n\n[session]\nenabled = false\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/data/log.db"));
        assert!(!config.session.enabled);
        assert!(config.reference.airports_path.is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_session_config_deserialize() {
        let json = r#"{"enabled": false}"#;
        let session: SessionConfig = serde_json::from_str(json).unwrap();
        assert!(!session.enabled);
        assert!(session.last_access_path.is_none());
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("database_path"));
        assert!(json.contains("airports_path"));
    }
}
