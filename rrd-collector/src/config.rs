//! Configuration for polling and correlation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::{CollectorError, CollectorResult};

/// Default seconds of history requested from each host
pub const DEFAULT_LOOKBACK_SECONDS: u64 = 10;
/// Default per-host request timeout
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
/// Default value of the `hostname` label for entries that cannot be correlated
pub const DEFAULT_UNKNOWN_LABEL: &str = "unknown";

/// Collector configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Per-host request configuration
    pub fetcher: FetcherConfig,

    /// Correlation configuration
    pub mapper: MapperConfig,
}

/// Per-host `rrd_updates` request configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// URL scheme used to reach hosts
    pub scheme: String,

    /// How far back the `start` query parameter reaches, in seconds
    pub lookback_secs: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Accept self-signed host certificates
    pub accept_invalid_certs: bool,
}

/// Correlation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// `hostname` label value for entries whose entity cannot be resolved
    pub unknown_label: String,
}

/// HTTP Basic credentials presented to every host
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `XENRRD_USERNAME` and `XENRRD_PASSWORD`
    pub fn from_env() -> CollectorResult<Self> {
        let username = std::env::var("XENRRD_USERNAME")
            .map_err(|_| CollectorError::configuration("XENRRD_USERNAME is not set"))?;
        let password = std::env::var("XENRRD_PASSWORD").unwrap_or_default();
        Ok(Self { username, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            lookback_secs: DEFAULT_LOOKBACK_SECONDS,
            timeout_secs: DEFAULT_TIMEOUT_SECONDS,
            accept_invalid_certs: false,
        }
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            unknown_label: DEFAULT_UNKNOWN_LABEL.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Get request timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate fetcher settings
    pub fn validate(&self) -> CollectorResult<()> {
        if self.scheme != "https" && self.scheme != "http" {
            return Err(CollectorError::configuration(format!(
                "Unsupported scheme '{}': must be http or https",
                self.scheme
            )));
        }

        if self.timeout_secs == 0 {
            return Err(CollectorError::configuration(
                "Timeout must be greater than 0",
            ));
        }

        if self.lookback_secs == 0 {
            return Err(CollectorError::configuration(
                "Lookback must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl CollectorConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> CollectorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CollectorError::configuration(format!("Failed to read config file: {e}"))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            CollectorError::configuration(format!("Failed to parse config file: {e}"))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `XENRRD_*` environment overrides on top of this configuration
    pub fn with_env_overrides(mut self) -> CollectorResult<Self> {
        if let Ok(timeout) = std::env::var("XENRRD_TIMEOUT_SECS") {
            self.fetcher.timeout_secs = timeout.parse().map_err(|e| {
                CollectorError::configuration(format!("Invalid XENRRD_TIMEOUT_SECS: {e}"))
            })?;
        }

        if let Ok(lookback) = std::env::var("XENRRD_LOOKBACK_SECS") {
            self.fetcher.lookback_secs = lookback.parse().map_err(|e| {
                CollectorError::configuration(format!("Invalid XENRRD_LOOKBACK_SECS: {e}"))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> CollectorResult<()> {
        self.fetcher.validate()
    }
}
