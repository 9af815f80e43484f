//! Correlation of legend entries with inventory records
//!
//! Each legend entry names its entity only by UUID. The correlator resolves
//! that UUID against the poll cycle's inventory and attaches the labels the
//! metrics backend groups by.

use crate::config::MapperConfig;
use crate::inventory::{HostRecord, HostRef, Inventory, VmRecord, VmRef};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};
use xenrrd_protocol::metric::{HOSTNAME_LABEL, RESIDENT_HOST_LABEL, SCOPE_LABEL, UUID_LABEL};
use xenrrd_protocol::{
    EntityType, MappedMetric, MetricIdentity, Payload, decompose_cpu_metric,
    normalize_metric_name,
};

/// Inventory record a UUID points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    Host(HostRef),
    Vm(VmRef),
}

/// Reverse lookup from UUID to opaque reference across hosts and VMs
#[derive(Debug, Default)]
pub struct UuidIndex {
    entries: HashMap<String, EntityRef>,
}

impl UuidIndex {
    /// Index every host, then every VM.
    ///
    /// UUIDs must be unique across both sets. On a collision the entry
    /// indexed first is kept and the collision is logged.
    pub fn build(inventory: &Inventory) -> Self {
        let mut index = Self {
            entries: HashMap::with_capacity(inventory.hosts.len() + inventory.vms.len()),
        };

        for (opaque_ref, host) in &inventory.hosts {
            index.insert(&host.uuid, EntityRef::Host(opaque_ref.clone()));
        }
        for (opaque_ref, vm) in &inventory.vms {
            index.insert(&vm.uuid, EntityRef::Vm(opaque_ref.clone()));
        }

        index
    }

    fn insert(&mut self, uuid: &str, entity: EntityRef) {
        if let Some(existing) = self.entries.get(uuid) {
            warn!(
                uuid = %uuid,
                kept = ?existing,
                rejected = ?entity,
                "UUID is shared by more than one inventory record"
            );
            return;
        }
        self.entries.insert(uuid.to_string(), entity);
    }

    pub fn get(&self, uuid: &str) -> Option<&EntityRef> {
        self.entries.get(uuid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a legend entry's UUID resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum EntityResolution<'a> {
    Vm {
        vm: &'a VmRecord,
        /// `None` when the VM's resident host is not in the inventory
        resident_host: Option<&'a HostRecord>,
    },
    Host(&'a HostRecord),
    Unknown,
}

/// Maps decoded payloads to labeled samples for one poll cycle
pub struct Correlator<'a> {
    inventory: &'a Inventory,
    index: UuidIndex,
    config: &'a MapperConfig,
}

impl<'a> Correlator<'a> {
    pub fn new(inventory: &'a Inventory, config: &'a MapperConfig) -> Self {
        Self {
            inventory,
            index: UuidIndex::build(inventory),
            config,
        }
    }

    /// Resolve an entry's entity, honouring its declared entity type
    pub fn resolve(&self, identity: &MetricIdentity) -> EntityResolution<'a> {
        let entity = self.index.get(&identity.entity_uuid);

        match (&identity.entity_type, entity) {
            (EntityType::Vm, Some(EntityRef::Vm(vm_ref))) => match self.inventory.vms.get(vm_ref)
            {
                Some(vm) => EntityResolution::Vm {
                    vm,
                    resident_host: self.inventory.hosts.get(&vm.resident_on),
                },
                None => EntityResolution::Unknown,
            },
            (EntityType::Host, Some(EntityRef::Host(host_ref))) => self
                .inventory
                .hosts
                .get(host_ref)
                .map_or(EntityResolution::Unknown, EntityResolution::Host),
            _ => EntityResolution::Unknown,
        }
    }

    /// Label set for one entry
    pub fn labels(&self, identity: &MetricIdentity) -> BTreeMap<String, String> {
        let (hostname, resident_host) = match self.resolve(identity) {
            EntityResolution::Vm { vm, resident_host } => (
                vm.name_label.clone(),
                resident_host
                    .map(|host| host.hostname.clone())
                    .unwrap_or_default(),
            ),
            EntityResolution::Host(host) => (host.hostname.clone(), String::new()),
            EntityResolution::Unknown => {
                debug!(
                    uuid = %identity.entity_uuid,
                    entity_type = %identity.entity_type,
                    "No inventory record for legend entry"
                );
                (self.config.unknown_label.clone(), String::new())
            }
        };

        BTreeMap::from([
            (UUID_LABEL.to_string(), identity.entity_uuid.clone()),
            (HOSTNAME_LABEL.to_string(), hostname),
            (RESIDENT_HOST_LABEL.to_string(), resident_host),
            (SCOPE_LABEL.to_string(), identity.entity_type.to_string()),
        ])
    }

    /// Build the sample for one entry and its value
    pub fn map_entry(&self, identity: &MetricIdentity, value: f64) -> MappedMetric {
        let mut labels = self.labels(identity);

        let name = match decompose_cpu_metric(&identity.metric_name) {
            Some(cpu) => {
                labels.extend(cpu.labels);
                cpu.name.to_string()
            }
            None => identity.metric_name.clone(),
        };

        MappedMetric::new(normalize_metric_name(&name), labels, value)
    }

    /// One sample per legend entry per payload, in payload then legend order.
    ///
    /// Values come from each payload's first row. A payload without rows
    /// contributes nothing.
    pub fn map_payloads(&self, payloads: &[Payload]) -> Vec<MappedMetric> {
        let capacity = payloads.iter().map(|payload| payload.legend.len()).sum();
        let mut mapped = Vec::with_capacity(capacity);

        for payload in payloads {
            let Some(row) = payload.latest_row() else {
                debug!(
                    start = payload.start_time,
                    columns = payload.legend.len(),
                    "Payload has no rows, nothing to map"
                );
                continue;
            };

            for (identity, value) in payload.legend.iter().zip(&row.values) {
                mapped.push(self.map_entry(identity, *value));
            }

            if row.values.len() != payload.legend.len() {
                warn!(
                    values = row.values.len(),
                    columns = payload.legend.len(),
                    "Row width differs from legend, extra entries skipped"
                );
            }
        }

        mapped
    }
}

/// Map every payload against `inventory`
pub fn map_payloads(
    payloads: &[Payload],
    inventory: &Inventory,
    config: &MapperConfig,
) -> Vec<MappedMetric> {
    Correlator::new(inventory, config).map_payloads(payloads)
}
