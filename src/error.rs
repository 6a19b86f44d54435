//! Error taxonomy for the sync pipeline.
//!
//! Only [`SyncError::Config`] is fatal to a whole run. Everything else is
//! caught at the smallest scope that produced it (one league, one entity,
//! one day of transactions) and logged.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing credential or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider answered with a non-success status.
    #[error("{endpoint} => {status}")]
    Upstream { endpoint: String, status: u16 },

    /// Request never produced a response (DNS, TLS, timeout).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body was not JSON.
    #[error("invalid JSON from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SyncError {
    pub fn is_config(&self) -> bool {
        matches!(self, SyncError::Config(_))
    }
}
