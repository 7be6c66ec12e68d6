//! Syntactic username validation.
//!
//! Candidates that fail here are never sent to the lookup service and never recorded.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Longest username the lookup service accepts.
pub const MAX_USERNAME_LEN: usize = 25;

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Empty string
    Empty,
    /// More than [`MAX_USERNAME_LEN`] characters
    TooLong {
        /// Actual length in characters
        len: usize,
    },
    /// Contains a character outside `[A-Za-z0-9_]`
    InvalidCharacter {
        /// First offending character
        ch: char,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty username"),
            Self::TooLong { len } => {
                write!(f, "{len} characters, maximum is {MAX_USERNAME_LEN}")
            }
            Self::InvalidCharacter { ch } => write!(f, "invalid character {ch:?}"),
        }
    }
}

/// Check a candidate, reporting why it was rejected.
pub fn validate(candidate: &str) -> Result<(), Rejection> {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"));

    if candidate.is_empty() {
        return Err(Rejection::Empty);
    }

    let len = candidate.chars().count();
    if len > MAX_USERNAME_LEN {
        return Err(Rejection::TooLong { len });
    }

    if regex.is_match(candidate) {
        Ok(())
    } else {
        let ch = candidate
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
            .unwrap_or('?');
        Err(Rejection::InvalidCharacter { ch })
    }
}

/// Whether a candidate is acceptable to the lookup service.
#[must_use]
pub fn is_valid(candidate: &str) -> bool {
    validate(candidate).is_ok()
}
