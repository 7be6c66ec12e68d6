//! Per-cycle bookkeeping: loop state, known-set and counters.

use recon_registry::Registry;
use std::collections::HashSet;
use std::fmt;

/// Where the scan loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Obtaining a token
    Authenticating,
    /// Loading patterns and enumerating candidates
    Generating,
    /// Looking up candidates one by one
    Scanning,
    /// Waiting for the next cycle
    CoolingDown,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticating => write!(f, "AUTHENTICATING"),
            Self::Generating => write!(f, "GENERATING"),
            Self::Scanning => write!(f, "SCANNING"),
            Self::CoolingDown => write!(f, "COOLING_DOWN"),
        }
    }
}

/// Usernames already handled, seeded from the registry at cycle start.
///
/// Identifiers resolved or confirmed absent during the cycle are added in
/// memory only. Nothing here outlives the cycle.
#[derive(Debug, Default)]
pub struct CycleState {
    known: HashSet<String>,
}

impl CycleState {
    /// Seed the known-set from persisted suspects.
    #[must_use]
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            known: registry.usernames().map(str::to_ascii_lowercase).collect(),
        }
    }

    /// Whether `username` was already handled.
    #[must_use]
    pub fn is_known(&self, username: &str) -> bool {
        self.known.contains(&username.to_ascii_lowercase())
    }

    /// Record `username` as handled for the rest of the cycle.
    pub fn mark_known(&mut self, username: &str) {
        self.known.insert(username.to_ascii_lowercase());
    }

    /// Number of known usernames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Whether the known-set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

/// Counters for one completed (or interrupted) cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Candidates generated
    pub candidates: usize,
    /// Skipped because already known
    pub skipped: usize,
    /// Rejected by the validator
    pub invalid: usize,
    /// Sent to the lookup service
    pub looked_up: usize,
    /// Resolved to an existing account
    pub found: usize,
    /// New suspects written to the registry
    pub recorded: usize,
    /// Existing accounts that did not classify as suspect
    pub ignored: usize,
    /// No such account
    pub not_found: usize,
    /// Rate-limited lookups, deferred to the next cycle
    pub rate_limited: usize,
    /// Lookups that failed transiently
    pub errors: usize,
    /// Stopped early by cancellation
    pub cancelled: bool,
}

impl CycleReport {
    /// Start a report for `candidates` generated identifiers.
    #[must_use]
    pub fn new(candidates: usize) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }
}
