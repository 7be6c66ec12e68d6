//! Error types for pattern loading and candidate generation.

use thiserror::Error;

/// Errors that can occur while loading patterns or generating candidates.
#[derive(Error, Debug)]
pub enum PatternError {
    /// Failed to read the pattern file
    #[error("failed to read pattern file {path}: {source}")]
    Io {
        /// Path to the pattern file
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Pattern file is not valid JSON or has the wrong shape
    #[error("failed to parse pattern file {path}: {source}")]
    Parse {
        /// Path to the pattern file
        path: String,
        /// JSON parse error
        #[source]
        source: serde_json::Error,
    },

    /// The ruleset would expand to more candidates than allowed
    #[error("pattern set expands to up to {bound} candidates, limit is {limit}")]
    TooManyCandidates {
        /// Upper bound on the number of candidates
        bound: u64,
        /// Configured limit
        limit: u64,
    },
}

impl From<PatternError> for recon_core::ReconError {
    fn from(err: PatternError) -> Self {
        Self::Pattern(err.to_string())
    }
}

/// Result type for pattern operations.
pub type Result<T> = std::result::Result<T, PatternError>;
