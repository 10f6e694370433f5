//! Error types for warc-clean
//!
//! Two layers of errors exist:
//! - [`Error`]: run-level failures. Only obtaining the record sequence at all
//!   (an unreadable or structurally invalid container) aborts a run.
//! - [`CleanError`]: per-record failures. These are contained at the
//!   dispatcher boundary, logged, and the affected record is dropped from
//!   the output without touching sibling records.

use thiserror::Error;

/// Result type alias for warc-clean operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for warc-clean
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "uri_include")
        key: Option<String>,
    },

    /// Invalid or unreadable archive container
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Per-record cleaning error
    #[error("cleaning error: {0}")]
    Clean(#[from] CleanError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors scoped to cleaning a single record
///
/// A `CleanError` never escapes the dispatcher: the record it belongs to is
/// excluded from the output and the run continues.
#[derive(Debug, Error)]
pub enum CleanError {
    /// Record body could not be decoded and parsed as an HTML document
    #[error("failed to parse record body for `{uri}`: {reason}")]
    Parse {
        /// Target URI of the record that failed to parse (may be empty)
        uri: String,
        /// The reason parsing failed
        reason: String,
    },

    /// Cleaning work for one record panicked or could not be joined
    #[error("worker failed while cleaning `{uri}`: {reason}")]
    Worker {
        /// Target URI of the record whose worker failed (may be empty)
        uri: String,
        /// The reason the worker failed
        reason: String,
    },
}
