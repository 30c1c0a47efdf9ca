//! Configuration loading and management.
//!
//! Configuration is loaded with the following precedence:
//! 1. Environment variables (`FORGE_*`)
//! 2. Config file (`~/.forge/config.toml`)
//! 3. Defaults

use crate::chat::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::{Error, Result};
use crate::storage::get_forge_home;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,

    /// Completion endpoint configuration.
    pub gemini: GeminiConfig,

    /// Logging configuration.
    pub log: LogConfig,

    /// Credential from `FORGE_API_KEY`. Takes precedence over the stored
    /// key and is never written to disk.
    #[serde(skip)]
    pub api_key_override: Option<String>,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the forge home directory.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: get_forge_home(),
        }
    }
}

/// Completion endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Scheme and host of the endpoint.
    pub base_url: String,

    /// Model name placed in the request path.
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive used when `FORGE_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Load configuration with precedence: env vars → file → defaults.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
pub fn load_config() -> Result<Config> {
    let mut config = load_config_file(&get_config_path())?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse `path`, or return defaults if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path).map_err(Error::Storage)?;
    toml::from_str(&contents).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

/// Get the path to the config file.
fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("FORGE_CONFIG") {
        return PathBuf::from(path);
    }

    get_forge_home().join("config.toml")
}

/// Apply environment variable overrides to config.
fn apply_env_overrides(config: &mut Config) {
    // Storage path
    if let Ok(path) = env::var("FORGE_STORAGE_PATH") {
        config.storage.path = PathBuf::from(path);
    } else if let Ok(home) = env::var("FORGE_HOME") {
        config.storage.path = PathBuf::from(home);
    }

    if let Ok(url) = env::var("FORGE_GEMINI_BASE_URL") {
        config.gemini.base_url = url;
    }

    if let Ok(model) = env::var("FORGE_GEMINI_MODEL") {
        config.gemini.model = model;
    }

    if let Ok(key) = env::var("FORGE_API_KEY") {
        if !key.trim().is_empty() {
            config.api_key_override = Some(key.trim().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.gemini.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.log.level, "warn");
        assert!(config.api_key_override.is_none());
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
            [storage]
            path = "/tmp/forge-test"

            [gemini]
            base_url = "http://localhost:8080"
            model = "gemini-2.0-flash"

            [log]
            level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("/tmp/forge-test"));
        assert_eq!(config.gemini.base_url, "http://localhost:8080");
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml = r#"
            [gemini]
            model = "gemini-pro"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.gemini.model, "gemini-pro");
        assert_eq!(config.gemini.base_url, DEFAULT_BASE_URL); // Default
        assert_eq!(config.log.level, "warn"); // Default
    }

    #[test]
    fn missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config_file(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config.gemini.model, DEFAULT_MODEL);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[gemini\nmodel = ").unwrap();
        assert!(matches!(load_config_file(&path), Err(Error::Config(_))));
    }
}
