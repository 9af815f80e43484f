//! `xenrrd` configuration file

use crate::logging::LoggingConfig;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use xenrrd_collector::{CollectorConfig, Credentials};
use xenrrd_monitoring::ExporterConfig;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seconds between poll cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// TOML file listing the pool's hosts and VMs
    pub inventory_path: PathBuf,

    /// Where each cycle's exposition text is written; stdout when unset
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Host credentials; `XENRRD_USERNAME`/`XENRRD_PASSWORD` when absent
    #[serde(default)]
    pub credentials: Option<Credentials>,

    #[serde(default)]
    pub collector: CollectorConfig,

    #[serde(default)]
    pub exporter: ExporterConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_poll_interval() -> u64 {
    60
}

impl AppConfig {
    /// Load configuration from file, apply environment overrides and validate
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::parse(&content)?;
        config.collector = config.collector.with_env_overrides()?;
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be greater than 0");
        }
        self.collector.validate()?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Configured credentials, falling back to the environment
    pub fn credentials(&self) -> Result<Credentials> {
        match &self.credentials {
            Some(credentials) => Ok(credentials.clone()),
            None => Ok(Credentials::from_env()?),
        }
    }
}
