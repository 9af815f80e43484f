//! Inventory records used to correlate legend UUIDs
//!
//! Records are produced by an external inventory source once per poll cycle
//! and are only ever read by the collector.

use crate::error::{CollectorError, CollectorResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque reference naming a host record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostRef(pub String);

/// Opaque reference naming a VM record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VmRef(pub String);

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for VmRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for VmRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A physical host in the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    pub opaque_ref: HostRef,
    pub uuid: String,
    pub hostname: String,
    /// Address the host's `rrd_updates` endpoint is reached on, optionally with a port
    pub address: String,
}

/// A virtual machine in the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmRecord {
    pub opaque_ref: VmRef,
    pub uuid: String,
    pub name_label: String,
    /// Host the VM currently runs on
    pub resident_on: HostRef,
}

/// One poll cycle's view of the pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub hosts: HashMap<HostRef, HostRecord>,
    pub vms: HashMap<VmRef, VmRecord>,
}

impl Inventory {
    /// Build an inventory keyed by each record's own opaque reference
    pub fn from_records(
        hosts: impl IntoIterator<Item = HostRecord>,
        vms: impl IntoIterator<Item = VmRecord>,
    ) -> Self {
        Self {
            hosts: hosts
                .into_iter()
                .map(|host| (host.opaque_ref.clone(), host))
                .collect(),
            vms: vms
                .into_iter()
                .map(|vm| (vm.opaque_ref.clone(), vm))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.vms.is_empty()
    }
}

/// Supplier of fresh inventory snapshots
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Take a snapshot of the pool's hosts and VMs
    async fn snapshot(&self) -> CollectorResult<Inventory>;
}

#[derive(Debug, Default, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    hosts: Vec<HostRecord>,
    #[serde(default)]
    vms: Vec<VmRecord>,
}

/// Inventory read from a TOML file with `[[hosts]]` and `[[vms]]` tables.
///
/// The file is re-read on every snapshot so edits are picked up by the next
/// poll cycle.
#[derive(Debug, Clone)]
pub struct StaticInventory {
    path: PathBuf,
}

impl StaticInventory {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse inventory TOML text
    pub fn parse(content: &str) -> CollectorResult<Inventory> {
        let file: InventoryFile = toml::from_str(content)
            .map_err(|e| CollectorError::inventory(format!("Failed to parse inventory: {e}")))?;
        Ok(Inventory::from_records(file.hosts, file.vms))
    }
}

#[async_trait]
impl InventorySource for StaticInventory {
    async fn snapshot(&self) -> CollectorResult<Inventory> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CollectorError::inventory(format!(
                "Failed to read inventory file {}: {e}",
                self.path.display()
            ))
        })?;
        Self::parse(&content)
    }
}
