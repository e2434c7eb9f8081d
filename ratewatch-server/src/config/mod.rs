//! Configuration module for ratewatch-server.
//!
//! Handles loading configuration from the TOML file, CLI overrides, and
//! the `DATABASE_URL` environment variable.

pub mod file;

use crate::config::file::FileConfig;
use ratewatch_core::sources::SourceMode;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// Reads the TOML file, applies CLI overrides, and validates the
    /// result. Configuration is loaded once at startup; there is no
    /// runtime reload.
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            config.server.listen = listen;
        }

        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.refresh.interval_secs == 0 {
        return Err(ConfigError::Validation(
            "refresh.interval_secs must be greater than zero".to_string(),
        ));
    }
    if config.refresh.mode == SourceMode::Fiat && config.refresh.fiat_api_url.is_empty() {
        return Err(ConfigError::Validation(
            "refresh.fiat_api_url must be set in fiat mode".to_string(),
        ));
    }
    if config.bus.topic.is_empty() {
        return Err(ConfigError::Validation(
            "bus.topic must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::{BusConfig, RefreshConfig, ServerConfig};

    fn valid_config() -> FileConfig {
        FileConfig {
            server: ServerConfig::default(),
            refresh: RefreshConfig::default(),
            bus: BusConfig::default(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = valid_config();
        config.refresh.interval_secs = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn fiat_mode_requires_a_primary_url() {
        let mut config = valid_config();
        config.refresh.mode = SourceMode::Fiat;
        config.refresh.fiat_api_url = String::new();
        assert!(validate(&config).is_err());

        // The URL is only required in fiat mode.
        config.refresh.mode = SourceMode::Mock;
        assert!(validate(&config).is_ok());
    }
}
