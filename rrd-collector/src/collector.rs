//! One poll cycle: fetch from every host, then correlate

use crate::config::{CollectorConfig, Credentials};
use crate::error::CollectorResult;
use crate::fetcher::RrdFetcher;
use crate::inventory::{Inventory, InventorySource};
use crate::mapper::Correlator;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;
use xenrrd_protocol::MappedMetric;

/// Outcome of a single poll cycle
#[derive(Debug, Clone, Default)]
pub struct PollReport {
    /// Samples ready for exposition
    pub metrics: Vec<MappedMetric>,
    /// Hosts a request was dispatched to
    pub hosts_polled: usize,
    /// Hosts that contributed no payload
    pub hosts_failed: usize,
    pub duration: Duration,
}

impl PollReport {
    pub fn hosts_succeeded(&self) -> usize {
        self.hosts_polled - self.hosts_failed
    }
}

/// Polls the pool and produces labeled samples
#[derive(Debug, Clone)]
pub struct Collector {
    config: CollectorConfig,
    fetcher: RrdFetcher,
}

impl Collector {
    pub fn new(config: CollectorConfig, credentials: Credentials) -> CollectorResult<Self> {
        let fetcher = RrdFetcher::new(&config.fetcher, credentials)?;
        Ok(Self { config, fetcher })
    }

    /// Use an already configured fetcher
    pub fn with_fetcher(config: CollectorConfig, fetcher: RrdFetcher) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Poll every host in `inventory` once.
    ///
    /// Never fails: hosts that cannot be polled are counted in
    /// [`PollReport::hosts_failed`] and contribute no samples.
    pub async fn poll_once(&self, inventory: &Inventory) -> PollReport {
        let started = Instant::now();

        let outcome = self.fetcher.fetch_all(&inventory.hosts).await;
        let metrics = Correlator::new(inventory, &self.config.mapper).map_payloads(&outcome.payloads);

        let report = PollReport {
            hosts_polled: outcome.hosts_polled(),
            hosts_failed: outcome.failures.len(),
            metrics,
            duration: started.elapsed(),
        };

        info!(
            hosts_polled = report.hosts_polled,
            hosts_failed = report.hosts_failed,
            samples = report.metrics.len(),
            duration_ms = report.duration.as_millis() as u64,
            "Poll cycle complete"
        );

        report
    }

    /// Take a fresh inventory snapshot and poll it
    pub async fn poll(&self, source: &dyn InventorySource) -> CollectorResult<PollReport> {
        let inventory = source.snapshot().await?;
        Ok(self.poll_once(&inventory).await)
    }
}
