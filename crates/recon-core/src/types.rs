//! Account records shared across the Recon crates.
//!
//! A [`ResolvedAccount`] is what the lookup service hands back for a candidate.
//! Once classified it becomes an [`AccountRecord`], which is the unit the
//! findings store persists.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Account metadata returned by a positive lookup, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAccount {
    /// Login name as reported by the lookup service
    pub username: String,
    /// Identifier assigned by the lookup service
    #[serde(rename = "id")]
    pub external_id: String,
    /// Display name (may differ from the login in case or script)
    pub display_name: String,
    /// When the lookup happened (second precision, UTC)
    pub checked_at: DateTime<Utc>,
}

impl ResolvedAccount {
    /// Create a resolved account stamped with the current time.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        external_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            external_id: external_id.into(),
            display_name: display_name.into(),
            checked_at: Utc::now().trunc_subsecs(0),
        }
    }
}

/// A classified account.
///
/// Serializes to the findings-store shape `{username, id, display_name, checked_at}`.
/// The suspect flag is not written: only suspects are ever persisted, so
/// anything read back from the store is a suspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account data from the lookup service
    #[serde(flatten)]
    pub account: ResolvedAccount,
    /// Whether the classifier flagged the username
    #[serde(skip_serializing, default = "persisted_records_are_suspects")]
    pub suspect: bool,
}

fn persisted_records_are_suspects() -> bool {
    true
}

impl AccountRecord {
    /// Attach a classification result to a resolved account.
    #[must_use]
    pub fn classified(account: ResolvedAccount, suspect: bool) -> Self {
        Self { account, suspect }
    }

    /// Login name of the account.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.account.username
    }
}
