//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "server.base_url must not be empty".into(),
            ));
        }
        if self.worker.max_workers == 0 || self.worker.max_workers > 16 {
            return Err(ConfigError::ValidationError(
                "worker.max_workers must be between 1 and 16".into(),
            ));
        }
        if self.query.temperature < 0.0 || self.query.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "query.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.query.probe_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "query.probe_timeout_ms must be > 0".into(),
            ));
        }
        if self.query.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "query.request_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max_workers() {
        let mut config = Config::default();
        config.worker.max_workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_workers"));
    }

    #[test]
    fn test_validate_rejects_oversized_max_workers() {
        let mut config = Config::default();
        config.worker.max_workers = 64;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_workers"));
    }

    #[test]
    fn test_validate_rejects_invalid_temperature() {
        let mut config = Config::default();
        config.query.temperature = 2.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));

        config.query.temperature = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let mut config = Config::default();
        config.query.probe_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("probe_timeout_ms"));

        let mut config = Config::default();
        config.query.request_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let mut config = Config::default();
        config.server.base_url = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }
}
