//! Client credentials for the identity service.

use crate::error::{LookupError, Result};
use std::fmt;
use zeroize::Zeroizing;

/// OAuth client id and secret, read once from the process environment.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: Zeroizing<String>,
}

impl Credentials {
    /// Create credentials from explicit values.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Zeroizing::new(client_secret.into()),
        }
    }

    /// Read credentials from the named environment variables.
    ///
    /// # Errors
    /// Returns `MissingCredential` naming the first unset or empty variable.
    pub fn from_env(client_id_var: &str, client_secret_var: &str) -> Result<Self> {
        Self::from_lookup(client_id_var, client_secret_var, |key| {
            std::env::var(key).ok()
        })
    }

    fn from_lookup(
        client_id_var: &str,
        client_secret_var: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let read = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| LookupError::MissingCredential {
                    var: var.to_string(),
                })
        };

        let client_id = read(client_id_var)?;
        let client_secret = read(client_secret_var)?;
        Ok(Self::new(client_id, client_secret))
    }

    /// Public client id, sent as the `Client-ID` header.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client secret, only sent to the token endpoint.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
