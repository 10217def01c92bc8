//! Typed errors for the pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`). The two families
//! deliberately propagate differently: a [`FetchError`] aborts the run, a
//! [`PublishError`] is folded into that sink's outcome and never cascades.

use thiserror::Error;

/// Failures retrieving the source page. Fatal to the run: when the fetch
/// fails, zero measurements are guaranteed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Transport-level failure (connection, DNS, timeout).
    #[error("request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a non-success status.
    #[error("unexpected status {status} fetching {url}")]
    Status { status: u16, url: String },
}

/// Failures of a single sink's publish attempt. Contained per sink: reported
/// in the outcome, never fatal to the pipeline.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A mandatory sink setting is absent. Raised before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// The sink could not be reached or refused the session.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The textual reading is not convertible to a number.
    #[error("value {value:?} is not numeric: {reason}")]
    Parse { value: String, reason: String },

    /// The sink rejected the write itself.
    #[error("write failed: {0}")]
    Write(String),
}

/// Result type alias for fetch/extract operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for sink publish attempts.
pub type PublishResult<T> = std::result::Result<T, PublishError>;
