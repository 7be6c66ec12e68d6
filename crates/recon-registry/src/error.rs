//! Error types for the findings store.

use thiserror::Error;

/// Errors that can occur while persisting findings.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Only classified suspects may be persisted
    #[error("refusing to persist non-suspect account {username}")]
    NotSuspect {
        /// Username of the rejected record
        username: String,
    },

    /// Failed to read or write the findings file
    #[error("findings store I/O error at {path}: {source}")]
    Io {
        /// Path to the findings file
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Findings file exists but is not a valid findings array
    #[error("malformed findings store at {path}: {source}")]
    Malformed {
        /// Path to the findings file
        path: String,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the collection
    #[error("failed to serialize findings: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<RegistryError> for recon_core::ReconError {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err.to_string())
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
