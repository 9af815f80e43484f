//! Concurrent `rrd_updates` collection for a pool of virtualization hosts
//!
//! This crate turns an inventory of hosts and VMs into labeled samples:
//! - One authenticated `rrd_updates` request per host, all in flight at once
//! - Best-effort fan-in: a failed host is logged and dropped for the cycle
//! - Correlation of legend UUIDs against host and VM records
//! - Per-core CPU metrics folded into a labeled `cpu` metric
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xenrrd_collector::{Collector, CollectorConfig, Credentials, StaticInventory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let collector = Collector::new(
//!         CollectorConfig::default(),
//!         Credentials::new("root", "secret"),
//!     )?;
//!
//!     let inventory = StaticInventory::new("inventory.toml");
//!     let report = collector.poll(&inventory).await?;
//!
//!     for metric in &report.metrics {
//!         println!("{} {:?} {}", metric.name, metric.labels, metric.value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod inventory;
pub mod mapper;

#[cfg(test)]
mod mapper_tests;

pub use collector::{Collector, PollReport};
pub use config::{CollectorConfig, Credentials, FetcherConfig, MapperConfig};
pub use error::{CollectorError, CollectorResult};
pub use fetcher::{FetchOutcome, HostTarget, RrdFetcher, rrd_updates_url};
pub use inventory::{HostRecord, HostRef, Inventory, InventorySource, StaticInventory, VmRecord, VmRef};
pub use mapper::{Correlator, EntityRef, EntityResolution, UuidIndex, map_payloads};
