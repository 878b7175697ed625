//! Connector configuration.

use crate::error::{ConnectorError, Result};
use avi_client::{AviClient, AviClientBuilder, RateLimitConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Configuration for a connector process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// HTTP listen address (default: 0.0.0.0:8080).
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// How the connector talks to controllers.
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Controller client settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept controller certificates that do not verify. Controllers
    /// usually serve self-signed certificates.
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,

    /// Sustained requests per second towards controllers.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Requests allowed in a burst.
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            controller: ControllerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            accept_invalid_certs: true,
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl ConnectorConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| ConnectorError::Config(format!("{}: {e}", path.display())))
        } else {
            Ok(Self::default())
        }
    }

    /// Write the config as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConnectorError::Config(e.to_string()))
    }
}

impl ControllerConfig {
    pub fn client_builder(&self) -> AviClientBuilder {
        AviClient::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .accept_invalid_certs(self.accept_invalid_certs)
            .rate_limit(
                RateLimitConfig::new()
                    .requests_per_second(self.requests_per_second)
                    .burst_size(self.burst_size),
            )
    }

    pub fn client(&self) -> Result<AviClient> {
        self.client_builder()
            .build()
            .map_err(|e| ConnectorError::Config(e.to_string()))
    }
}

// Default value functions for serde.
fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

const fn default_timeout() -> u64 {
    30
}

const fn default_true() -> bool {
    true
}

const fn default_requests_per_second() -> u32 {
    20
}

const fn default_burst_size() -> u32 {
    20
}

fn default_filter() -> String {
    String::from("info")
}
