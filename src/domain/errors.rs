//! Domain error types
//!
//! This module defines the error hierarchy for cdc-resolved.
//! Errors are domain-specific and don't expose third-party types.

use crate::core::resolved::timestamp::HlcTimestamp;
use thiserror::Error;

/// SQLSTATE reported by PostgreSQL and CockroachDB for serialization failures
pub const SERIALIZATION_FAILURE_SQLSTATE: &str = "40001";

/// Main cdc-resolved error type
///
/// This is the primary error type used throughout the crate.
#[derive(Debug, Error)]
pub enum ResolvedError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A resolved payload was rejected by the parser
    #[error("Invalid resolved payload: {0}")]
    Parse(#[from] ParseError),

    /// Database-related errors (statement failures, missing relations, constraint violations)
    #[error("Database error: {0}")]
    Database(String),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// The storage engine aborted the transaction because of a concurrent writer.
    /// This is the only retryable error.
    #[error("Serialization conflict: {0}")]
    SerializationConflict(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A strictly monotonic store refused to move a watermark backwards
    #[error("Refusing to regress resolved timestamp for endpoint '{endpoint}': current {current}, proposed {proposed}")]
    Regression {
        endpoint: String,
        current: HlcTimestamp,
        proposed: HlcTimestamp,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ResolvedError {
    /// Whether re-running the whole transaction may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SerializationConflict(_))
    }
}

/// Errors produced while decoding a resolved timestamp payload
///
/// None of these are retryable: the input itself is bad.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The payload has no `resolved` field
    #[error("payload is missing the 'resolved' field")]
    MissingField,

    /// The payload is not a JSON object, or the timestamp does not split into
    /// two integer segments
    #[error("malformed resolved timestamp: {0}")]
    MalformedTimestamp(String),

    /// The wall-clock component is zero, which is reserved for "not yet advanced"
    #[error("resolved timestamp has zero nanos")]
    ZeroTimestamp,
}

// Conversion implementations for common error types

impl From<std::io::Error> for ResolvedError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ResolvedError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ResolvedError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<tokio_postgres::Error> for ResolvedError {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(state) = err.code() {
            if state.code() == SERIALIZATION_FAILURE_SQLSTATE {
                return Self::SerializationConflict(err.to_string());
            }
            return Self::Database(err.to_string());
        }

        if err.is_closed() {
            Self::Connection(err.to_string())
        } else {
            Self::Database(err.to_string())
        }
    }
}
