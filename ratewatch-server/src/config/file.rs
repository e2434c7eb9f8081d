//! TOML file configuration structures.
//!
//! These structs directly map to the `ratewatch-config.toml` file format.

use ratewatch_core::sources::SourceMode;
use serde::Deserialize;
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub bus: BusConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

/// Refresh scheduler configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Which rate-source chain the scheduler uses.
    #[serde(default)]
    pub mode: SourceMode,
    /// Seconds between refresh cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Primary endpoint queried in fiat mode.
    #[serde(default = "default_fiat_api_url")]
    pub fiat_api_url: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            interval_secs: default_interval_secs(),
            fiat_api_url: default_fiat_api_url(),
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

fn default_fiat_api_url() -> String {
    "https://api.exchangerate-api.com/v4/latest/USD".to_string()
}

/// Message bus configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// NATS server URL.
    #[serde(default = "default_bus_url")]
    pub url: String,
    /// Topic every change event is published to.
    #[serde(default = "default_bus_topic")]
    pub topic: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            url: default_bus_url(),
            topic: default_bus_topic(),
        }
    }
}

fn default_bus_url() -> String {
    "nats://127.0.0.1:4222".to_string()
}

fn default_bus_topic() -> String {
    "items.updates".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:9000"

[refresh]
mode = "crypto"
interval_secs = 30
fiat_api_url = "https://rates.example.com/latest"

[bus]
url = "nats://bus.internal:4222"
topic = "rates.changes"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 9000);
        assert_eq!(config.refresh.mode, SourceMode::Crypto);
        assert_eq!(config.refresh.interval_secs, 30);
        assert_eq!(config.bus.topic, "rates.changes");
    }

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen.port(), 8000);
        assert_eq!(config.refresh.mode, SourceMode::Fiat);
        assert_eq!(config.refresh.interval_secs, 60);
        assert_eq!(config.bus.url, "nats://127.0.0.1:4222");
        assert_eq!(config.bus.topic, "items.updates");
    }

    #[test]
    fn mode_names_are_lowercase() {
        let config: FileConfig = toml::from_str("[refresh]\nmode = \"mock\"").unwrap();
        assert_eq!(config.refresh.mode, SourceMode::Mock);

        let err = toml::from_str::<FileConfig>("[refresh]\nmode = \"Mock\"");
        assert!(err.is_err());
    }
}
