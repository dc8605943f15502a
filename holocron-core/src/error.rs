//! Error types for Holocron operations

use thiserror::Error;

/// Errors produced while fetching from the remote catalog.
///
/// These are stored on cache entries and never thrown across the store
/// boundary. Stale responses are not errors: they are reported as a discarded
/// commit by the cache store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The transport could not reach the endpoint.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The endpoint answered with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    Remote { status: u16, message: String },

    /// The endpoint answered, but the body did not have the expected shape.
    #[error("Invalid response: {reason}")]
    Decode { reason: String },

    /// The cache store was disposed while the caller was waiting on it.
    #[error("Cache entry disposed before the request settled")]
    Disposed,

    /// The caller that owned the request went away before it completed.
    #[error("Request cancelled before it completed")]
    Cancelled,
}

impl FetchError {
    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a remote (non-success status) error.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// HTTP status for remote errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

/// Validation errors for programmer-supplied input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

// =============================================================================
// TESTS
// =============================================================================
