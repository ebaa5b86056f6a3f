//! Configuration management for Sift.
//!
//! Configuration is loaded from a platform config directory with sensible
//! defaults and written back only on explicit user action (`sift config
//! init`). All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Sift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inference endpoint settings
    pub server: ServerConfig,

    /// Per-request query settings
    pub query: QueryConfig,

    /// Worker settings
    pub worker: WorkerConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.sift.sift/config.toml
    /// - Linux: ~/.config/sift/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\sift\config\config.toml
    ///
    /// Falls back to ~/.sift/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "sift", "sift")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".sift").join("config.toml")
            })
    }

    /// Write the config to a specific file path, creating parent directories.
    ///
    /// This is the explicit save path; nothing in the library writes
    /// configuration implicitly.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiKind;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://localhost:11434");
        assert_eq!(config.worker.max_workers, 4);
        assert_eq!(config.query.request_timeout_ms, 90_000);
        assert!(config.server.api_type.is_none());
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[query]"));
        assert!(toml.contains("[worker]"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.server.model = "llava:13b".to_string();
        config.server.api_type = Some(ApiKind::OpenAiCompatible);
        config.query.temperature = 0.5;

        let toml = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.server.model, "llava:13b");
        assert_eq!(parsed.server.api_type, Some(ApiKind::OpenAiCompatible));
        assert_eq!(parsed.query.temperature, 0.5);
    }

    #[test]
    fn test_save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.server.model = "moondream".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server.model, "moondream");
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[worker]\nmax_workers = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("max_workers"));
    }
}
