//! Prometheus registry holding the latest poll cycle's samples

use crate::config::ExporterConfig;
use crate::self_metrics::SelfMetrics;
use crate::{MonitoringError, MonitoringResult};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};
use xenrrd_protocol::MappedMetric;

/// What a call to [`MetricsExporter::publish`] registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    /// Gauge families registered
    pub families: usize,
    /// Samples written into those families
    pub samples: usize,
    /// Families rejected by the registry, e.g. for an invalid name
    pub skipped_families: usize,
}

/// Exposes mapped samples as Prometheus gauges.
///
/// Each [`publish`](Self::publish) replaces every sample from the previous
/// cycle, so hosts that stop answering drop out of the exposition.
pub struct MetricsExporter {
    config: ExporterConfig,
    samples: RwLock<Registry>,
    self_registry: Registry,
    self_metrics: SelfMetrics,
}

impl MetricsExporter {
    pub fn new(config: ExporterConfig) -> MonitoringResult<Self> {
        let self_registry = Registry::new();
        let self_metrics = SelfMetrics::register(&self_registry)?;

        Ok(Self {
            config,
            samples: RwLock::new(Registry::new()),
            self_registry,
            self_metrics,
        })
    }

    /// Replace the exposed samples with `metrics`.
    ///
    /// Samples are grouped into one gauge family per name. Samples of one
    /// family with different label keys share the union of those keys; a
    /// key a sample lacks is exposed with an empty value.
    pub fn publish(&self, metrics: &[MappedMetric]) -> MonitoringResult<PublishSummary> {
        let registry = Registry::new();
        let mut summary = PublishSummary::default();

        let mut families: BTreeMap<&str, Vec<&MappedMetric>> = BTreeMap::new();
        for metric in metrics {
            families.entry(metric.name.as_str()).or_default().push(metric);
        }

        for (name, samples) in families {
            match self.build_family(name, &samples) {
                Ok((gauge_vec, distinct)) => {
                    if let Err(e) = registry.register(Box::new(gauge_vec)) {
                        warn!(metric = %name, error = %e, "Skipping metric family");
                        summary.skipped_families += 1;
                        continue;
                    }
                    summary.families += 1;
                    summary.samples += distinct;
                }
                Err(e) => {
                    warn!(metric = %name, error = %e, "Skipping metric family");
                    summary.skipped_families += 1;
                }
            }
        }

        *self.samples.write().unwrap_or_else(PoisonError::into_inner) = registry;
        self.self_metrics.samples_published.set(summary.samples as f64);

        debug!(
            families = summary.families,
            samples = summary.samples,
            skipped = summary.skipped_families,
            "Published samples"
        );

        Ok(summary)
    }

    /// Build one family, returning it with the number of distinct label sets.
    ///
    /// A later sample with an already seen label set replaces the earlier value.
    fn build_family(
        &self,
        name: &str,
        samples: &[&MappedMetric],
    ) -> MonitoringResult<(GaugeVec, usize)> {
        let label_names: Vec<&str> = samples
            .iter()
            .flat_map(|metric| metric.labels.keys().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut opts = Opts::new(name, format!("rrd_updates metric {name}"));
        if let Some(namespace) = &self.config.namespace {
            opts = opts.namespace(namespace.clone());
        }

        let gauge_vec = GaugeVec::new(opts, label_names.as_slice())?;
        let mut seen: BTreeSet<Vec<&str>> = BTreeSet::new();
        for metric in samples {
            let values: Vec<&str> = label_names
                .iter()
                .map(|key| metric.labels.get(*key).map_or("", String::as_str))
                .collect();
            gauge_vec
                .get_metric_with_label_values(values.as_slice())?
                .set(metric.value);
            if !seen.insert(values) {
                debug!(
                    metric = %name,
                    labels = ?metric.labels,
                    value = metric.value,
                    "Duplicate label set, keeping the later sample"
                );
            }
        }

        Ok((gauge_vec, seen.len()))
    }

    /// Record the outcome of one poll cycle in the self-metrics
    pub fn record_poll(&self, hosts_polled: usize, hosts_failed: usize, duration: Duration) {
        self.self_metrics.hosts_polled.set(hosts_polled as f64);
        self.self_metrics.hosts_failed.set(hosts_failed as f64);
        self.self_metrics
            .poll_duration_seconds
            .set(duration.as_secs_f64());
    }

    /// Render samples (and self-metrics, if enabled) in the text exposition format
    pub fn render(&self) -> MonitoringResult<String> {
        let mut metric_families = self
            .samples
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .gather();
        if self.config.self_metrics {
            metric_families.extend(self.self_registry.gather());
        }

        let encoder = TextEncoder::new();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| MonitoringError::Encoding(e.to_string()))
    }

    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }
}
