//! Error types for the lookup subsystem.

use thiserror::Error;

/// Errors raised while setting up a lookup client.
#[derive(Error, Debug)]
pub enum LookupError {
    /// A credential environment variable is unset or empty
    #[error("missing credential: environment variable {var} is not set")]
    MissingCredential {
        /// Name of the environment variable
        var: String,
    },

    /// The HTTP client could not be built
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Reasons authentication against the identity service failed.
///
/// Always recoverable: the scanner waits and retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// The service refused the credentials
    #[error("authentication rejected: HTTP {status}: {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The token endpoint could not be reached
    #[error("token request failed: {0}")]
    Network(String),

    /// The token endpoint answered with an unexpected body
    #[error("unexpected token response: {0}")]
    Malformed(String),
}

/// Result type for lookup client setup.
pub type Result<T> = std::result::Result<T, LookupError>;
