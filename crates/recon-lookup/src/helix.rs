//! Twitch Helix implementation of [`LookupClient`].

use crate::client::{AccessToken, LookupClient, LookupOutcome};
use crate::credentials::Credentials;
use crate::error::{AuthFailure, LookupError, Result};
use async_trait::async_trait;
use recon_core::{LookupConfig, ResolvedAccount};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Response header carrying the unix time at which the rate-limit bucket refills.
const RATE_LIMIT_RESET_HEADER: &str = "ratelimit-reset";

/// Lookup client for the Twitch Helix `users` endpoint.
pub struct HelixClient {
    client: Client,
    credentials: Credentials,
    token_url: String,
    users_url: String,
}

impl HelixClient {
    /// Create a client for the endpoints in `config`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &LookupConfig, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(LookupError::HttpClient)?;

        Ok(Self {
            client,
            credentials,
            token_url: config.token_url.clone(),
            users_url: config.users_url.clone(),
        })
    }
}

#[async_trait]
impl LookupClient for HelixClient {
    async fn authenticate(&self) -> std::result::Result<AccessToken, AuthFailure> {
        let response = self
            .client
            .post(&self.token_url)
            .query(&[
                ("client_id", self.credentials.client_id()),
                ("client_secret", self.credentials.client_secret()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| AuthFailure::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthFailure::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthFailure::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let token = parse_token_response(&body)?;
        debug!(expires_in = ?token.expires_in(), "obtained access token");
        Ok(token)
    }

    async fn resolve(&self, candidate: &str, token: &AccessToken) -> LookupOutcome {
        let response = match self
            .client
            .get(&self.users_url)
            .header("Client-ID", self.credentials.client_id())
            .bearer_auth(token.secret())
            .query(&[("login", candidate)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return LookupOutcome::TransientError(format!("request failed: {e}")),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let reset = response
                .headers()
                .get(RATE_LIMIT_RESET_HEADER)
                .and_then(|v| v.to_str().ok());
            return LookupOutcome::RateLimited {
                retry_after: rate_limit_hint(reset, chrono::Utc::now().timestamp()),
            };
        }

        if !status.is_success() {
            return LookupOutcome::TransientError(format!("HTTP {}", status.as_u16()));
        }

        match response.text().await {
            Ok(body) => parse_users_response(&body),
            Err(e) => LookupOutcome::TransientError(format!("failed to read body: {e}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    data: Vec<HelixUser>,
}

#[derive(Debug, Deserialize)]
struct HelixUser {
    id: String,
    login: String,
    display_name: String,
}

fn parse_token_response(body: &str) -> std::result::Result<AccessToken, AuthFailure> {
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|e| AuthFailure::Malformed(e.to_string()))?;

    if parsed.access_token.is_empty() {
        return Err(AuthFailure::Malformed("empty access_token".to_string()));
    }

    Ok(AccessToken::new(
        parsed.access_token,
        parsed.expires_in.map(Duration::from_secs),
    ))
}

/// Map a successful `users` response body to an outcome.
fn parse_users_response(body: &str) -> LookupOutcome {
    match serde_json::from_str::<UsersResponse>(body) {
        Ok(parsed) => match parsed.data.into_iter().next() {
            Some(user) => {
                LookupOutcome::Found(ResolvedAccount::new(user.login, user.id, user.display_name))
            }
            None => LookupOutcome::NotFound,
        },
        Err(e) => LookupOutcome::TransientError(format!("unexpected response body: {e}")),
    }
}

/// Time to wait according to a `Ratelimit-Reset` header value.
fn rate_limit_hint(reset: Option<&str>, now_unix: i64) -> Option<Duration> {
    let reset_at: i64 = reset?.trim().parse().ok()?;
    let wait = u64::try_from(reset_at.saturating_sub(now_unix)).ok()?;
    (wait > 0).then(|| Duration::from_secs(wait))
}
