//! Per-core CPU metric decomposition
//!
//! Hosts report per-CPU utilisation as `cpu0`, `cpu1`, ... and per-core
//! C-state residency as `cpu0-C0`, `cpu0-C1`, ... These are folded into a
//! single `cpu` metric distinguished by `cpu_num` and `core_num` labels.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Canonical name for every decomposed CPU metric
pub const CPU_METRIC_NAME: &str = "cpu";
/// Label carrying the CPU index
pub const CPU_NUM_LABEL: &str = "cpu_num";
/// Label carrying the C-state index
pub const CORE_NUM_LABEL: &str = "core_num";

static CPU_METRIC_REGEX: OnceLock<Regex> = OnceLock::new();

fn cpu_metric_regex() -> &'static Regex {
    CPU_METRIC_REGEX.get_or_init(|| {
        Regex::new(r"^cpu(?P<cpu_num>\d+)(?:-C(?P<core_num>\d+))?$")
            .expect("CPU metric regex is valid")
    })
}

/// A CPU metric split into its canonical name and numeric sub-labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuMetric {
    pub name: &'static str,
    pub labels: BTreeMap<String, String>,
}

/// Whether `name` is a per-CPU or per-core metric
pub fn is_cpu_metric(name: &str) -> bool {
    cpu_metric_regex().is_match(name)
}

/// Split a per-CPU metric name into `cpu` plus `cpu_num`/`core_num` labels.
///
/// Label values are the digits exactly as they appear in `name`. Returns
/// `None` for names that are not CPU metrics.
pub fn decompose_cpu_metric(name: &str) -> Option<CpuMetric> {
    let captures = cpu_metric_regex().captures(name)?;

    let mut labels = BTreeMap::new();
    for label in [CPU_NUM_LABEL, CORE_NUM_LABEL] {
        if let Some(value) = captures.name(label) {
            labels.insert(label.to_string(), value.as_str().to_string());
        }
    }

    Some(CpuMetric {
        name: CPU_METRIC_NAME,
        labels,
    })
}
