//! Error types for legend parsing and payload decoding

use thiserror::Error;

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while turning an `rrd_updates` response into a [`crate::Payload`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// A legend entry did not split into exactly four `:`-separated fields
    #[error("Could not parse legend entry from '{input}': expected 4 fields, found {fields}")]
    Parse { input: String, fields: usize },

    /// The response document was structurally invalid
    #[error("Invalid rrd_updates document: {reason}")]
    Decode { reason: String },
}

impl ProtocolError {
    /// Create a new legend entry parse error
    pub fn parse<S: Into<String>>(input: S, fields: usize) -> Self {
        Self::Parse {
            input: input.into(),
            fields,
        }
    }

    /// Create a new document decode error
    pub fn decode<S: Into<String>>(reason: S) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Whether this error came from a single malformed legend entry
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

impl From<quick_xml::DeError> for ProtocolError {
    fn from(err: quick_xml::DeError) -> Self {
        Self::decode(err.to_string())
    }
}
