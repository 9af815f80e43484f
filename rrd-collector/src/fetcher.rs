//! Concurrent per-host `rrd_updates` retrieval
//!
//! Every host in the inventory gets its own spawned task and its own copy of
//! the request parameters. The join waits for exactly one result per
//! dispatched host; failed hosts are logged and left out of the result set.

use crate::config::{Credentials, FetcherConfig};
use crate::error::{CollectorError, CollectorResult};
use crate::inventory::{HostRecord, HostRef};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;
use xenrrd_protocol::{Payload, RRD_UPDATES_PATH};

/// Per-host request parameters, owned by the task polling that host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    pub uuid: String,
    pub hostname: String,
    pub address: String,
}

impl From<&HostRecord> for HostTarget {
    fn from(host: &HostRecord) -> Self {
        Self {
            uuid: host.uuid.clone(),
            hostname: host.hostname.clone(),
            address: host.address.clone(),
        }
    }
}

/// Result of polling every host once
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Decoded payloads from hosts that answered correctly
    pub payloads: Vec<Payload>,
    /// One error per host that contributed nothing
    pub failures: Vec<CollectorError>,
}

impl FetchOutcome {
    /// Number of hosts that were dispatched
    pub fn hosts_polled(&self) -> usize {
        self.payloads.len() + self.failures.len()
    }
}

/// Build `<scheme>://<address>/rrd_updates?start=<start>&host=true`
pub fn rrd_updates_url(scheme: &str, address: &str, start: i64) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("{scheme}://{address}/"))?;
    url.set_path(RRD_UPDATES_PATH);
    url.query_pairs_mut()
        .append_pair("start", &start.to_string())
        .append_pair("host", "true");
    Ok(url)
}

/// Authenticated `rrd_updates` client shared by all per-host tasks
#[derive(Debug, Clone)]
pub struct RrdFetcher {
    client: reqwest::Client,
    credentials: Arc<Credentials>,
    scheme: String,
    lookback_secs: u64,
}

impl RrdFetcher {
    /// Create a fetcher with its own HTTP client
    pub fn new(config: &FetcherConfig, credentials: Credentials) -> CollectorResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| {
                CollectorError::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self::with_client(client, config, credentials))
    }

    /// Create a fetcher around a caller-supplied HTTP client.
    ///
    /// The client is expected to carry its own request timeout.
    pub fn with_client(
        client: reqwest::Client,
        config: &FetcherConfig,
        credentials: Credentials,
    ) -> Self {
        Self {
            client,
            credentials: Arc::new(credentials),
            scheme: config.scheme.clone(),
            lookback_secs: config.lookback_secs,
        }
    }

    /// `start` query parameter for a cycle issued at unix time `now`
    pub fn start_time(&self, now: i64) -> i64 {
        now - i64::try_from(self.lookback_secs).unwrap_or(i64::MAX)
    }

    /// Poll every host, starting the lookback window from the current time
    pub async fn fetch_all(&self, hosts: &HashMap<HostRef, HostRecord>) -> FetchOutcome {
        let start = self.start_time(chrono::Utc::now().timestamp());
        self.fetch_all_since(hosts, start).await
    }

    /// Poll every host for updates since `start`
    pub async fn fetch_all_since(
        &self,
        hosts: &HashMap<HostRef, HostRecord>,
        start: i64,
    ) -> FetchOutcome {
        let mut targets = Vec::with_capacity(hosts.len());
        let mut handles = Vec::with_capacity(hosts.len());

        for host in hosts.values() {
            let target = HostTarget::from(host);
            info!(
                uuid = %target.uuid,
                hostname = %target.hostname,
                address = %target.address,
                "Requesting rrd_updates"
            );

            let fetcher = self.clone();
            let task_target = target.clone();
            handles.push(tokio::spawn(async move {
                fetcher.fetch_host(&task_target, start).await
            }));
            targets.push(target);
        }

        let results = join_all(handles).await;

        let mut outcome = FetchOutcome::default();
        for (target, joined) in targets.into_iter().zip(results) {
            let result = joined.unwrap_or_else(|e| {
                Err(CollectorError::Worker {
                    host: target.hostname.clone(),
                    reason: e.to_string(),
                })
            });

            match result {
                Ok(payload) => outcome.payloads.push(payload),
                Err(e) => {
                    warn!(
                        uuid = %target.uuid,
                        hostname = %target.hostname,
                        address = %target.address,
                        error = %e,
                        "Error requesting rrd_updates, skipping host for this cycle"
                    );
                    outcome.failures.push(e);
                }
            }
        }

        outcome
    }

    /// Request and decode one host's updates since `start`
    pub async fn fetch_host(&self, target: &HostTarget, start: i64) -> CollectorResult<Payload> {
        let url = rrd_updates_url(&self.scheme, &target.address, start).map_err(|e| {
            CollectorError::InvalidAddress {
                host: target.hostname.clone(),
                address: target.address.clone(),
                reason: e.to_string(),
            }
        })?;

        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|e| CollectorError::transport(&target.hostname, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectorError::Status {
                host: target.hostname.clone(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CollectorError::transport(&target.hostname, e))?;

        let payload =
            Payload::decode(&body).map_err(|e| CollectorError::decode(&target.hostname, e))?;

        debug!(
            hostname = %target.hostname,
            columns = payload.legend.len(),
            rows = payload.rows.len(),
            "Decoded rrd_updates payload"
        );

        Ok(payload)
    }
}
