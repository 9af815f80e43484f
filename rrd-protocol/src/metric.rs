//! Labeled samples handed to the exposition layer

use std::collections::BTreeMap;

/// Label naming the entity UUID
pub const UUID_LABEL: &str = "uuid";
/// Label naming the VM name label or the host's hostname
pub const HOSTNAME_LABEL: &str = "hostname";
/// Label naming the host a VM is resident on; empty for host metrics
pub const RESIDENT_HOST_LABEL: &str = "resident_host";
/// Label carrying the entity type (`host`, `vm`, ...)
pub const SCOPE_LABEL: &str = "scope";

/// One labeled sample for one legend entry of one payload
#[derive(Debug, Clone, PartialEq)]
pub struct MappedMetric {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

impl MappedMetric {
    pub fn new(name: impl Into<String>, labels: BTreeMap<String, String>, value: f64) -> Self {
        Self {
            name: name.into(),
            labels,
            value,
        }
    }

    /// Look up a label value
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Make a metric name acceptable to the metrics backend by replacing every
/// `-` with `_`.
pub fn normalize_metric_name(name: &str) -> String {
    name.replace('-', "_")
}
