//! Prometheus exposition for collected `rrd_updates` samples
//!
//! # Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use xenrrd_monitoring::{ExporterConfig, MetricsExporter};
//! use xenrrd_protocol::MappedMetric;
//!
//! let exporter = MetricsExporter::new(ExporterConfig::default())?;
//! let labels = BTreeMap::from([("hostname".to_string(), "xen01".to_string())]);
//! exporter.publish(&[MappedMetric::new("memory_free_kib", labels, 2048.0)])?;
//!
//! let text = exporter.render()?;
//! assert!(text.contains(r#"memory_free_kib{hostname="xen01"} 2048"#));
//! # Ok::<(), xenrrd_monitoring::MonitoringError>(())
//! ```

pub mod config;
pub mod exporter;
mod self_metrics;

#[cfg(test)]
mod exporter_tests;

pub use config::ExporterConfig;
pub use exporter::{MetricsExporter, PublishSummary};

/// Result type for exposition operations
pub type MonitoringResult<T> = std::result::Result<T, MonitoringError>;

/// Exposition error types
#[derive(Debug, thiserror::Error)]
pub enum MonitoringError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}
