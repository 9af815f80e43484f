//! Core types for XAPI `rrd_updates` collection
//!
//! This crate owns the wire-facing half of the exporter:
//! - Parsing packed legend entries into [`MetricIdentity`] values
//! - Decoding an `xport` response body into a [`Payload`]
//! - Folding per-core CPU metric names into a single labeled `cpu` metric
//! - The [`MappedMetric`] sample type shared with the exposition layer
//!
//! # Quick Start
//!
//! ```rust
//! use xenrrd_protocol::{EntityType, MetricIdentity, Payload};
//!
//! let identity = MetricIdentity::parse(
//!     "AVERAGE:vm:15f9d56e-938a-34fc-73f3-a7e08a0445eb:vbd_xvdd_io_throughput_write",
//! )?;
//! assert_eq!(identity.entity_type, EntityType::Vm);
//!
//! let body = r#"<xport>
//!   <meta><start>10</start><columns>1</columns>
//!     <legend><entry>AVERAGE:host:555-555:cpu0</entry></legend></meta>
//!   <data><row><t>20</t><v>0.5</v></row></data>
//! </xport>"#;
//! let payload = Payload::decode(body.as_bytes())?;
//! assert_eq!(payload.latest_value(0), Some(0.5));
//! # Ok::<(), xenrrd_protocol::ProtocolError>(())
//! ```

pub mod cpu;
pub mod error;
pub mod identity;
pub mod metric;
pub mod payload;


pub use cpu::{CpuMetric, decompose_cpu_metric, is_cpu_metric};
pub use error::{ProtocolError, ProtocolResult};
pub use identity::{EntityType, MetricIdentity};
pub use metric::{MappedMetric, normalize_metric_name};
pub use payload::{ObservationRow, Payload};

/// Path of the per-host time-series endpoint
pub const RRD_UPDATES_PATH: &str = "rrd_updates";
