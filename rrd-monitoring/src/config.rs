//! Exposition configuration

use serde::{Deserialize, Serialize};

/// Exposition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Prefix joined to every sample family name with `_`
    pub namespace: Option<String>,
    /// Include the exporter's own poll statistics in the rendered output
    pub self_metrics: bool,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            self_metrics: true,
        }
    }
}
