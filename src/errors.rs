// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for doctor operations

use thiserror::Error;

/// Errors that can occur outside of diagnosis
///
/// Diagnosis itself never fails: rule conflicts, missing references and
/// manual-repair cases are reported as assessments and annotations.
#[derive(Debug, Error)]
pub enum DoctorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Snapshot could not be decoded into states
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// I/O error while reading a snapshot or writing a report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Source-of-truth transport error
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for doctor operations
pub type DoctorResult<T> = Result<T, DoctorError>;

impl From<serde_json::Error> for DoctorError {
    fn from(err: serde_json::Error) -> Self {
        DoctorError::Serialization(err.to_string())
    }
}

/// Errors raised by a source-of-truth call
///
/// Non-2xx statuses are not errors at this level: they are returned as the
/// call's status and judged by the repair executor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Target could not be reached
    #[error("Source of truth unavailable: {0}")]
    Unavailable(String),

    /// Request did not complete within the configured timeout
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Request could not be built or encoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Unavailable(_) | TransportError::Timeout(_))
    }
}
