//! Suspect classification.
//!
//! A username is suspect when any `prefix + suffix` run (no separator) occurs
//! anywhere in its lower-cased form. Extra characters around the run, or
//! separators inside the username that split it, are deliberately not required
//! to line up with any generated candidate.

use crate::PatternConfig;
use std::collections::BTreeSet;

/// Precomputed classifier for one ruleset.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    /// Lower-cased `prefix + suffix` concatenations
    needles: Vec<String>,
    /// Lower-cased free keywords
    keywords: Vec<String>,
}

impl Classifier {
    /// Build a classifier from explicit prefix and suffix sets.
    #[must_use]
    pub fn new(prefixes: &BTreeSet<String>, suffixes: &BTreeSet<String>) -> Self {
        let needles: BTreeSet<String> = prefixes
            .iter()
            .flat_map(|p| suffixes.iter().map(move |s| format!("{p}{s}").to_lowercase()))
            .collect();

        Self {
            needles: needles.into_iter().collect(),
            keywords: Vec::new(),
        }
    }

    /// Build a classifier for a full ruleset, keywords included.
    #[must_use]
    pub fn from_config(config: &PatternConfig) -> Self {
        let mut classifier = Self::new(&config.prefixes, &config.suffixes);
        classifier.keywords = config.keywords.iter().map(|k| k.to_lowercase()).collect();
        classifier
    }

    /// Whether `username` contains any prefix+suffix run.
    #[must_use]
    pub fn is_suspect(&self, username: &str) -> bool {
        self.matched_pattern(username).is_some()
    }

    /// The first prefix+suffix run found in `username`, if any.
    #[must_use]
    pub fn matched_pattern(&self, username: &str) -> Option<&str> {
        let lowered = username.to_lowercase();
        self.needles
            .iter()
            .find(|needle| lowered.contains(needle.as_str()))
            .map(String::as_str)
    }

    /// Keywords appearing in `username`.
    ///
    /// Informational only; keyword hits never make an account suspect.
    #[must_use]
    pub fn keyword_hits(&self, username: &str) -> Vec<&str> {
        let lowered = username.to_lowercase();
        self.keywords
            .iter()
            .filter(|kw| lowered.contains(kw.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// One-shot form of [`Classifier::is_suspect`].
#[must_use]
pub fn is_suspect(
    resolved_username: &str,
    prefixes: &BTreeSet<String>,
    suffixes: &BTreeSet<String>,
) -> bool {
    Classifier::new(prefixes, suffixes).is_suspect(resolved_username)
}
