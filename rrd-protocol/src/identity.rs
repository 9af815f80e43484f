//! Packed legend entry identities
//!
//! Every column of an `rrd_updates` document is named by a legend entry of the
//! form `KIND:ENTITY_TYPE:UUID:METRIC_NAME`, for example
//! `AVERAGE:vm:15f9d56e-938a-34fc-73f3-a7e08a0445eb:vbd_xvdd_io_throughput_write`.

use crate::error::{ProtocolError, ProtocolResult};
use std::fmt;
use std::str::FromStr;

const FIELD_DELIMITER: char = ':';

/// Owner of a time-series column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityType {
    /// A physical host
    Host,
    /// A virtual machine
    Vm,
    /// Any entity type the collector does not know how to correlate
    Other(String),
}

impl EntityType {
    /// The wire spelling, also used as the `scope` label
    pub fn as_str(&self) -> &str {
        match self {
            Self::Host => "host",
            Self::Vm => "vm",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for EntityType {
    fn from(raw: &str) -> Self {
        match raw {
            "host" => Self::Host,
            "vm" => Self::Vm,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed legend entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricIdentity {
    /// Consolidation function, e.g. `AVERAGE`
    pub kind: String,
    /// Owner of the column, `host` or `vm` on the wire
    pub entity_type: EntityType,
    /// UUID of the owning host or VM
    pub entity_uuid: String,
    /// Raw metric name, e.g. `cpu0-C1` or `memory_internal_free`
    pub metric_name: String,
}

impl MetricIdentity {
    /// Parse a packed `KIND:ENTITY_TYPE:UUID:METRIC_NAME` string.
    ///
    /// Only the field count is validated; the fields are assigned positionally.
    pub fn parse(input: &str) -> ProtocolResult<Self> {
        let fields: Vec<&str> = input.split(FIELD_DELIMITER).collect();
        match fields.as_slice() {
            [kind, entity_type, entity_uuid, metric_name] => Ok(Self {
                kind: (*kind).to_string(),
                entity_type: EntityType::from(*entity_type),
                entity_uuid: (*entity_uuid).to_string(),
                metric_name: (*metric_name).to_string(),
            }),
            _ => Err(ProtocolError::parse(input, fields.len())),
        }
    }
}

impl FromStr for MetricIdentity {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MetricIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
            self.kind, self.entity_type, self.entity_uuid, self.metric_name
        )
    }
}
