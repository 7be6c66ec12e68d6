//! Error types for the scan loop.

use recon_lookup::AuthFailure;
use recon_patterns::PatternError;
use recon_registry::RegistryError;
use thiserror::Error;

/// Failures that end a cycle early.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Could not obtain a token
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthFailure),

    /// Candidates could not be generated
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// A suspect could not be persisted
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The cycle panicked
    #[error("cycle panicked: {0}")]
    Panicked(String),
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
