use async_trait::async_trait;
use recon_core::{AppConfig, ResolvedAccount};
use recon_lookup::{AccessToken, AuthFailure, LookupClient, LookupOutcome};
use recon_registry::read_findings;
use recon_scanner::{ScanError, ScanOrchestrator};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Scripted stand-in for the identity service.
#[derive(Default)]
struct ScriptedLookup {
    /// Logins that exist
    accounts: HashSet<String>,
    /// One-shot outcomes consumed before falling back to `accounts`
    scripted: Mutex<HashMap<String, VecDeque<LookupOutcome>>>,
    /// Every candidate passed to `resolve`, in call order
    resolved: Mutex<Vec<String>>,
    /// When each `resolve` call happened
    resolved_at: Mutex<Vec<Instant>>,
    /// When each `authenticate` call happened
    authenticated_at: Mutex<Vec<Instant>>,
    auth_failures: AtomicUsize,
    auth_attempts: AtomicUsize,
    cancel: CancellationToken,
    cancel_on_auth: Option<usize>,
    cancel_after_resolves: Option<usize>,
    panic_on: Option<String>,
}

impl ScriptedLookup {
    fn with_accounts(cancel: &CancellationToken, accounts: &[&str]) -> Self {
        Self {
            accounts: accounts.iter().map(ToString::to_string).collect(),
            cancel: cancel.clone(),
            ..Self::default()
        }
    }

    fn script(self, candidate: &str, outcome: LookupOutcome) -> Self {
        self.scripted
            .lock()
            .expect("lock script")
            .entry(candidate.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    fn resolved(&self) -> Vec<String> {
        self.resolved.lock().expect("lock resolved").clone()
    }

    fn auth_attempts(&self) -> usize {
        self.auth_attempts.load(Ordering::SeqCst)
    }

    fn resolve_gaps(&self) -> Vec<Duration> {
        gaps(&self.resolved_at.lock().expect("lock resolved_at"))
    }

    fn auth_gaps(&self) -> Vec<Duration> {
        gaps(&self.authenticated_at.lock().expect("lock authenticated_at"))
    }
}

/// Time between consecutive calls
fn gaps(times: &[Instant]) -> Vec<Duration> {
    times.windows(2).map(|w| w[1] - w[0]).collect()
}

#[async_trait]
impl LookupClient for ScriptedLookup {
    async fn authenticate(&self) -> Result<AccessToken, AuthFailure> {
        self.authenticated_at
            .lock()
            .expect("lock authenticated_at")
            .push(Instant::now());
        let attempt = self.auth_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if Some(attempt) == self.cancel_on_auth {
            self.cancel.cancel();
        }

        let remaining = self.auth_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.auth_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AuthFailure::Rejected {
                status: 400,
                message: "invalid client".to_string(),
            });
        }

        Ok(AccessToken::new("token", None))
    }

    async fn resolve(&self, candidate: &str, _token: &AccessToken) -> LookupOutcome {
        self.resolved_at
            .lock()
            .expect("lock resolved_at")
            .push(Instant::now());
        let calls = {
            let mut resolved = self.resolved.lock().expect("lock resolved");
            resolved.push(candidate.to_string());
            resolved.len()
        };
        if Some(calls) == self.cancel_after_resolves {
            self.cancel.cancel();
        }

        if self.panic_on.as_deref() == Some(candidate) {
            panic!("lookup exploded on {candidate}");
        }

        let scripted = self
            .scripted
            .lock()
            .expect("lock script")
            .get_mut(candidate)
            .and_then(VecDeque::pop_front);
        if let Some(outcome) = scripted {
            return outcome;
        }

        let login = candidate.to_lowercase();
        if self.accounts.contains(&login) {
            LookupOutcome::Found(ResolvedAccount::new(
                login.clone(),
                format!("id-{login}"),
                login.to_uppercase(),
            ))
        } else {
            LookupOutcome::NotFound
        }
    }
}

/// Helper to write a pattern file and point a config at a scratch directory
fn setup(patterns: &str) -> (TempDir, AppConfig) {
    let tmp = TempDir::new().expect("create temp dir");
    let patterns_file = tmp.path().join("patterns.json");
    std::fs::write(&patterns_file, patterns).expect("write patterns");

    let mut config = AppConfig::default();
    config.paths.patterns_file = patterns_file;
    config.paths.findings_file = tmp.path().join("suspects").join("suspects.json");
    (tmp, config)
}

/// Candidates: test, test0, testsex, testsex0
const TEST_SEX: &str = r#"{
    "prefixes": ["test"],
    "sensitive_suffixes": ["sex"],
    "separators": [""],
    "max_variants": 1
}"#;

fn orchestrator(
    config: &AppConfig,
    lookup: &Arc<ScriptedLookup>,
    cancel: &CancellationToken,
) -> ScanOrchestrator {
    ScanOrchestrator::new(config, lookup.clone()).with_cancellation(cancel.clone())
}

fn findings(config: &AppConfig) -> Vec<String> {
    read_findings(&config.paths.findings_file)
        .expect("read findings")
        .iter()
        .map(|r| r.username().to_string())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_cycle_persists_only_suspects() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup::with_accounts(
        &cancel,
        &["test", "testsex", "testsex0"],
    ));

    let report = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect("cycle succeeds");

    assert_eq!(report.candidates, 4);
    assert_eq!(report.looked_up, 4);
    assert_eq!(report.found, 3);
    assert_eq!(report.recorded, 2);
    assert_eq!(report.ignored, 1);
    assert_eq!(report.not_found, 1);
    assert!(!report.cancelled);

    assert_eq!(lookup.resolved(), vec!["test", "test0", "testsex", "testsex0"]);
    assert_eq!(findings(&config), vec!["testsex", "testsex0"]);
}

#[tokio::test(start_paused = true)]
async fn test_rerun_records_nothing_new() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup::with_accounts(
        &cancel,
        &["test", "testsex", "testsex0"],
    ));

    let first = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect("first cycle");
    // Fresh orchestrator: only what was persisted carries over
    let second = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect("second cycle");

    assert_eq!(first.recorded, 2);
    assert_eq!(second.recorded, 0);
    assert_eq!(second.skipped, 2);
    // Non-suspects and misses are looked up again every cycle
    assert_eq!(second.looked_up, 2);
    assert_eq!(findings(&config), vec!["testsex", "testsex0"]);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_candidate_is_retried_next_cycle() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(
        ScriptedLookup::with_accounts(&cancel, &["testsex"])
            .script("testsex", LookupOutcome::RateLimited { retry_after: None }),
    );

    let first = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect("first cycle");
    assert_eq!(first.rate_limited, 1);
    assert_eq!(first.recorded, 0);
    assert!(findings(&config).is_empty());

    let second = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect("second cycle");
    assert_eq!(second.rate_limited, 0);
    assert_eq!(second.recorded, 1);
    assert_eq!(findings(&config), vec!["testsex"]);

    let attempts = lookup
        .resolved()
        .iter()
        .filter(|c| c.as_str() == "testsex")
        .count();
    assert_eq!(attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn test_transient_error_moves_on() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(
        ScriptedLookup::with_accounts(&cancel, &["testsex", "testsex0"]).script(
            "testsex",
            LookupOutcome::TransientError("HTTP 503".to_string()),
        ),
    );

    let report = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect("cycle succeeds");

    assert_eq!(report.errors, 1);
    assert_eq!(report.recorded, 1);
    assert_eq!(findings(&config), vec!["testsex0"]);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_candidates_never_reach_lookup() {
    let (_tmp, config) = setup(
        r#"{
            "prefixes": ["bad-name", "ok", "abcdefghijklmnopqrstuvwxyz"],
            "max_variants": 0
        }"#,
    );
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup::with_accounts(&cancel, &[]));

    let report = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect("cycle succeeds");

    assert_eq!(report.invalid, 2);
    assert_eq!(lookup.resolved(), vec!["ok"]);
    assert!(!config.paths.findings_file.exists());
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_between_candidates() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup {
        cancel_after_resolves: Some(1),
        ..ScriptedLookup::with_accounts(&cancel, &["testsex"])
    });

    let report = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect("cycle succeeds");

    assert!(report.cancelled);
    assert_eq!(report.looked_up, 1);
    assert_eq!(lookup.resolved(), vec!["test"]);
}

#[tokio::test(start_paused = true)]
async fn test_run_cycles_until_cancelled() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    // Cycle one resolves four candidates; cycle two skips testsex and stops after test0
    let lookup = Arc::new(ScriptedLookup {
        cancel_after_resolves: Some(6),
        ..ScriptedLookup::with_accounts(&cancel, &["testsex"])
    });

    orchestrator(&config, &lookup, &cancel).run().await;

    assert_eq!(lookup.auth_attempts(), 2);
    assert_eq!(
        lookup.resolved(),
        vec!["test", "test0", "testsex", "testsex0", "test", "test0"]
    );
    assert_eq!(findings(&config), vec!["testsex"]);
}

#[tokio::test(start_paused = true)]
async fn test_run_retries_failed_authentication() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup {
        auth_failures: AtomicUsize::new(1),
        cancel_after_resolves: Some(1),
        ..ScriptedLookup::with_accounts(&cancel, &[])
    });

    orchestrator(&config, &lookup, &cancel).run().await;

    assert_eq!(lookup.auth_attempts(), 2);
    assert_eq!(lookup.resolved(), vec!["test"]);
}

#[tokio::test(start_paused = true)]
async fn test_run_once_surfaces_auth_failure() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup {
        auth_failures: AtomicUsize::new(1),
        ..ScriptedLookup::with_accounts(&cancel, &[])
    });

    let err = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect_err("auth failure surfaces");

    assert!(matches!(err, ScanError::Auth(AuthFailure::Rejected { status: 400, .. })));
    assert!(lookup.resolved().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_run_recovers_from_persistence_failure() {
    let (_tmp, config) = setup(TEST_SEX);
    // A directory in place of the findings file makes every write fail
    std::fs::create_dir_all(&config.paths.findings_file).expect("create blocking dir");

    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup::with_accounts(&cancel, &["testsex"]));

    let err = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect_err("write failure ends the cycle");
    assert!(matches!(err, ScanError::Registry(_)));

    let looping = Arc::new(ScriptedLookup {
        cancel_on_auth: Some(2),
        ..ScriptedLookup::with_accounts(&cancel, &["testsex"])
    });
    orchestrator(&config, &looping, &cancel).run().await;

    // The failed cycle was followed by a fresh authentication
    assert_eq!(looping.auth_attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_run_survives_panicking_cycle() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup {
        panic_on: Some("test0".to_string()),
        cancel_on_auth: Some(2),
        ..ScriptedLookup::with_accounts(&cancel, &[])
    });

    orchestrator(&config, &lookup, &cancel).run().await;

    assert_eq!(lookup.auth_attempts(), 2);
    assert_eq!(lookup.resolved(), vec!["test", "test0"]);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_pattern_set_skips_cycle() {
    let (_tmp, mut config) = setup(TEST_SEX);
    config.scanning.max_candidates = 3;
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup::with_accounts(&cancel, &["testsex"]));

    let err = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect_err("bound exceeds limit");

    assert!(matches!(err, ScanError::Pattern(_)));
    assert!(lookup.resolved().is_empty());
}

/// Candidates: test, test0, test1
const TEST_ONLY: &str = r#"{"prefixes": ["test"], "max_variants": 2}"#;

#[tokio::test(start_paused = true)]
async fn test_rate_limit_pauses_sixty_seconds() {
    let (_tmp, config) = setup(TEST_ONLY);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(
        ScriptedLookup::with_accounts(&cancel, &[])
            .script("test", LookupOutcome::RateLimited { retry_after: None }),
    );

    let start = Instant::now();
    let report = orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect("cycle succeeds");

    assert_eq!(report.rate_limited, 1);
    assert_eq!(report.not_found, 2);
    // 60s after the rate limit, then 1s pacing after each remaining lookup
    assert_eq!(
        lookup.resolve_gaps(),
        vec![Duration::from_secs(60), Duration::from_secs(1)]
    );
    assert_eq!(start.elapsed(), Duration::from_secs(62));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_hint_is_honoured_up_to_ceiling() {
    let (_tmp, config) = setup(TEST_ONLY);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(
        ScriptedLookup::with_accounts(&cancel, &[])
            .script(
                "test",
                LookupOutcome::RateLimited {
                    retry_after: Some(Duration::from_secs(90)),
                },
            )
            .script(
                "test0",
                LookupOutcome::RateLimited {
                    retry_after: Some(Duration::from_secs(3600)),
                },
            ),
    );

    orchestrator(&config, &lookup, &cancel)
        .run_once()
        .await
        .expect("cycle succeeds");

    assert_eq!(
        lookup.resolve_gaps(),
        vec![Duration::from_secs(90), Duration::from_secs(900)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_authentication_waits_two_minutes() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup {
        auth_failures: AtomicUsize::new(2),
        cancel_after_resolves: Some(1),
        ..ScriptedLookup::with_accounts(&cancel, &[])
    });

    let start = Instant::now();
    orchestrator(&config, &lookup, &cancel).run().await;

    assert_eq!(
        lookup.auth_gaps(),
        vec![Duration::from_secs(120), Duration::from_secs(120)]
    );
    // Cancelled during the first lookup's pacing pause
    assert_eq!(start.elapsed(), Duration::from_secs(240));
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_between_cycles() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup {
        cancel_on_auth: Some(2),
        ..ScriptedLookup::with_accounts(&cancel, &[])
    });

    orchestrator(&config, &lookup, &cancel).run().await;

    assert_eq!(lookup.resolve_gaps(), vec![Duration::from_secs(1); 3]);
    // Four paced lookups, then the 300s cool-down
    assert_eq!(lookup.auth_gaps(), vec![Duration::from_secs(304)]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycle_backs_off_before_restarting() {
    let (_tmp, config) = setup(TEST_SEX);
    let cancel = CancellationToken::new();
    let lookup = Arc::new(ScriptedLookup {
        panic_on: Some("test0".to_string()),
        cancel_on_auth: Some(2),
        ..ScriptedLookup::with_accounts(&cancel, &[])
    });

    orchestrator(&config, &lookup, &cancel).run().await;

    // One paced lookup, then the 60s failure backoff instead of the cool-down
    assert_eq!(lookup.auth_gaps(), vec![Duration::from_secs(61)]);
}
