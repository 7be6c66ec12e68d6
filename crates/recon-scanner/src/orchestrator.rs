//! Scan orchestrator driving the authenticate / generate / scan / cool-down loop.
//!
//! Error recovery:
//!
//! - authentication failure: wait `auth_retry`, authenticate again
//! - unusable pattern set: log, skip straight to cool-down
//! - rate-limited lookup: pause, leave the candidate unknown (retried next cycle)
//! - transient lookup error: log, move on to the next candidate
//! - any other cycle failure, panics included: log, wait `failure_backoff`,
//!   restart from authentication

use crate::cycle::{CycleReport, CycleState, ScanState};
use crate::error::{Result, ScanError};
use crate::policy::BackoffPolicy;
use futures::FutureExt;
use recon_core::{AccountRecord, AppConfig, PathsConfig};
use recon_lookup::{AccessToken, LookupClient, LookupOutcome};
use recon_patterns::{generate_bounded, validate, Classifier, PatternConfig};
use recon_registry::Registry;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Candidates and rules for one cycle.
#[derive(Debug, Clone)]
pub struct CyclePlan {
    /// Identifier used to correlate the cycle's log lines
    pub cycle_id: Uuid,
    /// Generated candidates in lexicographic order
    pub candidates: BTreeSet<String>,
    /// Classifier built from the same ruleset
    pub classifier: Classifier,
}

/// Loop-internal state carrying what each step needs.
enum Step {
    Authenticating,
    Generating(AccessToken),
    Scanning(AccessToken, CyclePlan),
    CoolingDown,
}

impl Step {
    fn state(&self) -> ScanState {
        match self {
            Self::Authenticating => ScanState::Authenticating,
            Self::Generating(_) => ScanState::Generating,
            Self::Scanning(..) => ScanState::Scanning,
            Self::CoolingDown => ScanState::CoolingDown,
        }
    }
}

/// Drives scan cycles until cancelled.
pub struct ScanOrchestrator {
    /// External identity lookup capability
    lookup: Arc<dyn LookupClient>,
    /// Pattern and findings file locations
    paths: PathsConfig,
    /// Delays between lookups, cycles and retries
    policy: BackoffPolicy,
    /// Numeric-tail cap when the pattern file sets none
    default_max_variants: u32,
    /// Refuse pattern sets expanding beyond this many candidates
    max_candidates: u64,
    /// Cooperative shutdown signal
    cancel: CancellationToken,
}

impl ScanOrchestrator {
    /// Create an orchestrator from the application config.
    #[must_use]
    pub fn new(config: &AppConfig, lookup: Arc<dyn LookupClient>) -> Self {
        Self {
            lookup,
            paths: config.paths.clone(),
            policy: BackoffPolicy::from_config(&config.scanning),
            default_max_variants: config.scanning.max_variants,
            max_candidates: config.scanning.max_candidates,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the loop when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The delays this orchestrator applies.
    #[must_use]
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Run cycles until the cancellation token fires.
    ///
    /// Never returns an error: every failure is logged and followed by the
    /// matching backoff.
    pub async fn run(&self) {
        info!("scan loop started");
        let mut step = Step::Authenticating;

        while !self.cancel.is_cancelled() {
            debug!(state = %step.state(), "entering state");

            step = match step {
                Step::Authenticating => match self.lookup.authenticate().await {
                    Ok(token) => Step::Generating(token),
                    Err(e) => {
                        warn!(
                            tag = "ERROR",
                            error = %e,
                            retry_in = ?self.policy.auth_retry,
                            "authentication failed"
                        );
                        if !self.pause(self.policy.auth_retry).await {
                            break;
                        }
                        Step::Authenticating
                    }
                },
                Step::Generating(token) => match self.plan_cycle() {
                    Ok(plan) => Step::Scanning(token, plan),
                    Err(e) => {
                        error!(tag = "ERROR", error = %e, "cannot generate candidates, skipping cycle");
                        Step::CoolingDown
                    }
                },
                Step::Scanning(token, plan) => match self.scan_contained(&token, plan).await {
                    Ok(report) => {
                        log_report(&report);
                        Step::CoolingDown
                    }
                    Err(e) => {
                        error!(
                            tag = "ERROR",
                            error = %e,
                            retry_in = ?self.policy.failure_backoff,
                            "scan cycle failed"
                        );
                        if !self.pause(self.policy.failure_backoff).await {
                            break;
                        }
                        Step::Authenticating
                    }
                },
                Step::CoolingDown => {
                    info!(next_cycle_in = ?self.policy.cycle_cooldown, "cycle finished, cooling down");
                    if !self.pause(self.policy.cycle_cooldown).await {
                        break;
                    }
                    Step::Authenticating
                }
            };
        }

        info!("scan loop stopped");
    }

    /// Run exactly one cycle, surfacing failures instead of retrying.
    pub async fn run_once(&self) -> Result<CycleReport> {
        let token = self.lookup.authenticate().await?;
        let plan = self.plan_cycle()?;
        let report = self.scan_contained(&token, plan).await?;
        log_report(&report);
        Ok(report)
    }

    /// Load the current pattern file and enumerate this cycle's candidates.
    ///
    /// A missing or malformed pattern file counts as an empty ruleset.
    pub fn plan_cycle(&self) -> Result<CyclePlan> {
        let patterns = PatternConfig::load_or_empty(&self.paths.patterns_file);
        let candidates =
            generate_bounded(&patterns, self.default_max_variants, self.max_candidates)?;
        let cycle_id = Uuid::new_v4();

        info!(
            cycle_id = %cycle_id,
            candidates = candidates.len(),
            "generated candidates"
        );

        Ok(CyclePlan {
            cycle_id,
            candidates,
            classifier: Classifier::from_config(&patterns),
        })
    }

    /// Scan a plan, converting a panic into a cycle failure.
    async fn scan_contained(&self, token: &AccessToken, plan: CyclePlan) -> Result<CycleReport> {
        let span = info_span!("cycle", cycle_id = %plan.cycle_id);

        match AssertUnwindSafe(self.scan(token, plan).instrument(span))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(ScanError::Panicked(message))
            }
        }
    }

    /// Look up every candidate in order, persisting suspects as they are found.
    pub async fn scan(&self, token: &AccessToken, plan: CyclePlan) -> Result<CycleReport> {
        let mut registry = Registry::load(&self.paths.findings_file);
        let mut state = CycleState::from_registry(&registry);
        let mut report = CycleReport::new(plan.candidates.len());

        for candidate in &plan.candidates {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            if state.is_known(candidate) {
                info!(tag = "SKIP", username = %candidate, "already known");
                report.skipped += 1;
                continue;
            }

            if let Err(reason) = validate(candidate) {
                info!(tag = "INVALID", username = %candidate, %reason, "rejected before lookup");
                report.invalid += 1;
                continue;
            }

            report.looked_up += 1;
            let pause = match self.lookup.resolve(candidate, token).await {
                LookupOutcome::Found(account) => {
                    report.found += 1;
                    let username = account.username.clone();

                    if let Some(pattern) = plan.classifier.matched_pattern(&username) {
                        info!(tag = "FOUND", username = %username, id = %account.external_id, "account exists");
                        let pattern = pattern.to_string();
                        if registry.append(AccountRecord::classified(account, true))? {
                            report.recorded += 1;
                            warn!(
                                tag = "SUSPECT FLAGGED",
                                username = %username,
                                %pattern,
                                "suspect recorded"
                            );
                        }
                    } else {
                        let keywords = plan.classifier.keyword_hits(&username);
                        info!(
                            tag = "IGNORED",
                            username = %username,
                            ?keywords,
                            "account exists but does not match any pattern"
                        );
                        report.ignored += 1;
                    }

                    state.mark_known(candidate);
                    state.mark_known(&username);
                    self.policy.request_delay
                }
                LookupOutcome::NotFound => {
                    info!(tag = "NOT FOUND", username = %candidate, "no such account");
                    report.not_found += 1;
                    state.mark_known(candidate);
                    self.policy.request_delay
                }
                LookupOutcome::RateLimited { retry_after } => {
                    let pause = self.policy.rate_limit_pause(retry_after);
                    warn!(
                        tag = "RATE LIMIT",
                        username = %candidate,
                        pause = ?pause,
                        "rate limited, deferring candidate to next cycle"
                    );
                    report.rate_limited += 1;
                    pause
                }
                LookupOutcome::TransientError(message) => {
                    error!(tag = "ERROR", username = %candidate, error = %message, "lookup failed");
                    report.errors += 1;
                    self.policy.request_delay
                }
            };

            if !self.pause(pause).await {
                report.cancelled = true;
                break;
            }
        }

        Ok(report)
    }

    /// Sleep for `duration` unless cancelled first. Returns `false` on cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }

        tokio::select! {
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(duration) => true,
        }
    }
}

fn log_report(report: &CycleReport) {
    info!(
        candidates = report.candidates,
        skipped = report.skipped,
        invalid = report.invalid,
        looked_up = report.looked_up,
        found = report.found,
        recorded = report.recorded,
        ignored = report.ignored,
        not_found = report.not_found,
        rate_limited = report.rate_limited,
        errors = report.errors,
        cancelled = report.cancelled,
        "scan cycle complete"
    );
}
