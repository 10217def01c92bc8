//! Typed errors for the InfluxDB client.

use thiserror::Error;

/// Errors returned by [`InfluxClient`](crate::InfluxClient) operations.
#[derive(Debug, Error)]
pub enum InfluxError {
    /// Transport-level failure (connection refused, timeout, DNS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server accepted the request but rejected the write.
    #[error("write rejected ({status}): {message}")]
    Api { status: u16, message: String },

    /// The point cannot be serialized to line protocol.
    #[error("invalid point: {0}")]
    InvalidPoint(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, InfluxError>;
