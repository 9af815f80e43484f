//! `rrd_updates` payload decoding
//!
//! A host answers `GET /rrd_updates` with an `xport` document:
//!
//! ```text
//! <xport>
//!   <meta>
//!     <start>1700000000</start><step>5</step><end>1700000010</end>
//!     <rows>1</rows><columns>2</columns>
//!     <legend><entry>AVERAGE:host:...:cpu0</entry><entry>...</entry></legend>
//!   </meta>
//!   <data><row><t>1700000010</t><v>0.25</v><v>NaN</v></row></data>
//! </xport>
//! ```

use crate::error::{ProtocolError, ProtocolResult};
use crate::identity::MetricIdentity;
use serde::Deserialize;

/// One observation across every column of a payload
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    /// Unix seconds
    pub timestamp: i64,
    /// One value per legend entry, positionally aligned
    pub values: Vec<f64>,
}

/// One host's decoded time-series response for a poll cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub start_time: i64,
    pub step: Option<i64>,
    pub end_time: Option<i64>,
    pub column_count: i64,
    pub legend: Vec<MetricIdentity>,
    pub rows: Vec<ObservationRow>,
}

impl Payload {
    /// Decode a raw response body.
    ///
    /// Fails on malformed XML, on any malformed legend entry, and when the
    /// column count or a row's width disagrees with the legend.
    pub fn decode(body: &[u8]) -> ProtocolResult<Self> {
        let document: XportDocument = quick_xml::de::from_reader(body)?;
        Self::try_from(document)
    }

    /// Decode a response body that is already text
    pub fn decode_str(body: &str) -> ProtocolResult<Self> {
        let document: XportDocument = quick_xml::de::from_str(body)?;
        Self::try_from(document)
    }

    /// The row the mapping stage reads values from
    pub fn latest_row(&self) -> Option<&ObservationRow> {
        self.rows.first()
    }

    /// Value of legend column `index` in [`Self::latest_row`]
    pub fn latest_value(&self, index: usize) -> Option<f64> {
        self.latest_row()
            .and_then(|row| row.values.get(index))
            .copied()
    }
}

impl TryFrom<XportDocument> for Payload {
    type Error = ProtocolError;

    fn try_from(document: XportDocument) -> Result<Self, Self::Error> {
        let XportDocument { meta, data } = document;

        let legend = meta
            .legend
            .entries
            .iter()
            .map(|entry| MetricIdentity::parse(entry.trim()))
            .collect::<ProtocolResult<Vec<_>>>()?;

        if usize::try_from(meta.columns).ok() != Some(legend.len()) {
            return Err(ProtocolError::decode(format!(
                "meta declares {} columns but legend has {} entries",
                meta.columns,
                legend.len()
            )));
        }

        let mut rows = Vec::with_capacity(data.rows.len());
        for (index, row) in data.rows.into_iter().enumerate() {
            if row.v.len() != legend.len() {
                return Err(ProtocolError::decode(format!(
                    "row {} has {} values but legend has {} entries",
                    index,
                    row.v.len(),
                    legend.len()
                )));
            }
            rows.push(ObservationRow {
                timestamp: row.t,
                values: row.v,
            });
        }

        Ok(Self {
            start_time: meta.start,
            step: meta.step,
            end_time: meta.end,
            column_count: meta.columns,
            legend,
            rows,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename = "xport")]
struct XportDocument {
    meta: MetaElement,
    #[serde(default)]
    data: DataElement,
}

#[derive(Debug, Deserialize)]
struct MetaElement {
    start: i64,
    #[serde(default)]
    step: Option<i64>,
    #[serde(default)]
    end: Option<i64>,
    columns: i64,
    #[serde(default)]
    legend: LegendElement,
}

#[derive(Debug, Default, Deserialize)]
struct LegendElement {
    #[serde(default, rename = "entry")]
    entries: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DataElement {
    #[serde(default, rename = "row")]
    rows: Vec<RowElement>,
}

#[derive(Debug, Deserialize)]
struct RowElement {
    t: i64,
    #[serde(default)]
    v: Vec<f64>,
}
