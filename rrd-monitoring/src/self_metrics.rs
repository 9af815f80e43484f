//! The exporter's own poll statistics

use prometheus::{Gauge, Registry};

pub(crate) struct SelfMetrics {
    pub hosts_polled: Gauge,
    pub hosts_failed: Gauge,
    pub poll_duration_seconds: Gauge,
    pub samples_published: Gauge,
}

impl SelfMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let hosts_polled = Gauge::new(
            "xenrrd_hosts_polled",
            "Hosts an rrd_updates request was sent to in the last poll cycle",
        )?;
        let hosts_failed = Gauge::new(
            "xenrrd_hosts_failed",
            "Hosts that contributed no samples in the last poll cycle",
        )?;
        let poll_duration_seconds = Gauge::new(
            "xenrrd_poll_duration_seconds",
            "Duration of the last poll cycle in seconds",
        )?;
        let samples_published = Gauge::new(
            "xenrrd_samples_published",
            "Samples exposed from the last poll cycle",
        )?;

        registry.register(Box::new(hosts_polled.clone()))?;
        registry.register(Box::new(hosts_failed.clone()))?;
        registry.register(Box::new(poll_duration_seconds.clone()))?;
        registry.register(Box::new(samples_published.clone()))?;

        Ok(Self {
            hosts_polled,
            hosts_failed,
            poll_duration_seconds,
            samples_published,
        })
    }
}
