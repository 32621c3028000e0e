//! Error types used throughout the application
//!
//! The error taxonomy is a closed tagged union: every failure surfaced to a
//! caller is one of these variants with explicit fields, so call sites can
//! match exhaustively instead of probing ad hoc optional fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a single item inside a bulk operation that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    /// Identifier of the item that failed.
    pub id: String,
    /// Backend-provided failure description.
    pub message: String,
}

/// Main error type for the CheapAlarms gateway
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheapAlarmsError {
    /// Request rejected before any remote call was made (missing confirmation
    /// token, malformed identifier, empty id set).
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Backend returned a non-2xx response with a message.
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Backend reported a mixed per-item outcome.
    #[error("Partial failure: {succeeded} succeeded, {} failed", errors.len())]
    PartialFailure { succeeded: usize, errors: Vec<ItemError> },

    /// Backend asked us to back off; `retry_after_secs` is relayed verbatim.
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Transport failed before a response was obtained.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Request was cancelled before settlement; never retried automatically.
    #[error("Operation aborted")]
    Aborted,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CheapAlarmsError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    /// Shorthand for a configuration failure.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Stable label suitable for metrics/logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Remote { .. } => "remote",
            Self::PartialFailure { .. } => "partial_failure",
            Self::RateLimited { .. } => "rate_limited",
            Self::Network { .. } => "network",
            Self::Aborted => "aborted",
            Self::Config { .. } => "config",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for CheapAlarms operations
pub type Result<T> = std::result::Result<T, CheapAlarmsError>;
