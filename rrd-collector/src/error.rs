//! Error types for polling and correlation

use thiserror::Error;
use xenrrd_protocol::ProtocolError;

/// Result type for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;

/// Errors that can occur while collecting from hosts
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Request could not be sent or the response body could not be read
    #[error("Transport error for host '{host}': {source}")]
    Transport {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    /// Host answered with a non-2xx status
    #[error("Host '{host}' returned HTTP {status}")]
    Status {
        host: String,
        status: reqwest::StatusCode,
    },

    /// Host answered with a body that is not a valid rrd_updates document
    #[error("Invalid payload from host '{host}': {source}")]
    Decode {
        host: String,
        #[source]
        source: ProtocolError,
    },

    /// Request URL could not be built from the host address
    #[error("Invalid address '{address}' for host '{host}': {reason}")]
    InvalidAddress {
        host: String,
        address: String,
        reason: String,
    },

    /// Per-host worker ended without reporting
    #[error("Worker for host '{host}' failed: {reason}")]
    Worker { host: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Inventory snapshot could not be produced
    #[error("Inventory error: {message}")]
    Inventory { message: String },

    /// I/O error (configuration and inventory files)
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl CollectorError {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new inventory error
    pub fn inventory<S: Into<String>>(message: S) -> Self {
        Self::Inventory {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(host: S, source: reqwest::Error) -> Self {
        Self::Transport {
            host: host.into(),
            source,
        }
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(host: S, source: ProtocolError) -> Self {
        Self::Decode {
            host: host.into(),
            source,
        }
    }

    /// Host the error belongs to, if it is a per-host failure
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::Transport { host, .. }
            | Self::Status { host, .. }
            | Self::Decode { host, .. }
            | Self::InvalidAddress { host, .. }
            | Self::Worker { host, .. } => Some(host),
            _ => None,
        }
    }
}
