//! The lookup capability as seen by the scanner.

use crate::error::AuthFailure;
use async_trait::async_trait;
use recon_core::ResolvedAccount;
use std::fmt;
use std::time::Duration;
use zeroize::Zeroizing;

/// Bearer token obtained from [`LookupClient::authenticate`].
#[derive(Clone)]
pub struct AccessToken {
    value: Zeroizing<String>,
    expires_in: Option<Duration>,
}

impl AccessToken {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            value: Zeroizing::new(value.into()),
            expires_in,
        }
    }

    /// Raw token value for the `Authorization` header.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.value
    }

    /// Lifetime reported by the service, if any.
    #[must_use]
    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Result of resolving one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The account exists
    Found(ResolvedAccount),
    /// No account with that name
    NotFound,
    /// The service asked us to slow down
    RateLimited {
        /// How long the service asked us to wait, if it said
        retry_after: Option<Duration>,
    },
    /// Anything else went wrong; the candidate is skipped for this cycle
    TransientError(String),
}

/// Capability to authenticate against and query the identity service.
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Obtain a token for subsequent `resolve` calls.
    async fn authenticate(&self) -> Result<AccessToken, AuthFailure>;

    /// Resolve a single candidate username.
    async fn resolve(&self, candidate: &str, token: &AccessToken) -> LookupOutcome;
}
