//! Fixed-delay backoff and pacing policy.

use recon_core::ScanningConfig;
use std::time::Duration;

/// Every delay the scan loop inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Pacing between two lookups
    pub request_delay: Duration,
    /// Wait between the end of a cycle and the next authentication
    pub cycle_cooldown: Duration,
    /// Wait before retrying a failed authentication
    pub auth_retry: Duration,
    /// Base pause after a rate-limited lookup
    pub rate_limit_backoff: Duration,
    /// Ceiling for a rate-limit pause extended by a service hint
    pub max_rate_limit_backoff: Duration,
    /// Wait after a failed cycle before starting over
    pub failure_backoff: Duration,
}

impl BackoffPolicy {
    /// Build the policy from scanning settings.
    #[must_use]
    pub fn from_config(config: &ScanningConfig) -> Self {
        Self {
            request_delay: config.request_delay(),
            cycle_cooldown: config.cycle_cooldown(),
            auth_retry: config.auth_retry(),
            rate_limit_backoff: config.rate_limit_backoff(),
            max_rate_limit_backoff: config.max_rate_limit_backoff(),
            failure_backoff: config.failure_backoff(),
        }
    }

    /// Pause after a rate-limited lookup.
    ///
    /// Never shorter than the base backoff. A longer hint from the service is
    /// honored up to `max_rate_limit_backoff`.
    #[must_use]
    pub fn rate_limit_pause(&self, retry_after: Option<Duration>) -> Duration {
        let ceiling = self.max_rate_limit_backoff.max(self.rate_limit_backoff);
        retry_after
            .map_or(self.rate_limit_backoff, |hint| hint.max(self.rate_limit_backoff))
            .min(ceiling)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&ScanningConfig::default())
    }
}
