//! Pattern ruleset loading.
//!
//! The ruleset is a JSON object:
//!
//! ```json
//! {
//!   "prefixes": ["test"],
//!   "sensitive_suffixes": ["sex"],
//!   "contains_keywords": ["nsfw"],
//!   "separators": ["", "_"],
//!   "max_variants": 10
//! }
//! ```
//!
//! Every key is optional. Missing lists are empty, never absent.

use crate::error::{PatternError, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// Static ruleset driving one scan cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternConfig {
    /// Leading fragments every candidate starts with
    pub prefixes: BTreeSet<String>,
    /// Fragments appended after a separator
    pub suffixes: BTreeSet<String>,
    /// Joiners placed between prefix and suffix; `""` means direct concatenation
    pub separators: Vec<String>,
    /// Free keywords, reported for context only
    pub keywords: BTreeSet<String>,
    /// Numeric-tail cap from the file, if it sets one
    pub max_variants: Option<u32>,
}

/// On-disk shape of the pattern file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PatternFile {
    prefixes: Vec<String>,
    sensitive_suffixes: Vec<String>,
    contains_keywords: Vec<String>,
    separators: Vec<String>,
    max_variants: Option<u32>,
}

impl From<PatternFile> for PatternConfig {
    fn from(file: PatternFile) -> Self {
        let mut separators = Vec::with_capacity(file.separators.len());
        for sep in file.separators {
            if !separators.contains(&sep) {
                separators.push(sep);
            }
        }

        Self {
            prefixes: normalize(file.prefixes),
            suffixes: normalize(file.sensitive_suffixes),
            separators,
            keywords: normalize(file.contains_keywords),
            max_variants: file.max_variants,
        }
    }
}

/// Trim entries and drop blanks; set semantics collapse duplicates.
fn normalize(values: Vec<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl PatternConfig {
    /// Parse a ruleset from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let file: PatternFile = serde_json::from_str(json)?;
        Ok(file.into())
    }

    /// Load a ruleset from disk.
    ///
    /// # Errors
    /// Returns error if the file can't be read or isn't a valid ruleset.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| PatternError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_json(&contents).map_err(|source| PatternError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        debug!(
            path = %path.display(),
            prefixes = config.prefixes.len(),
            suffixes = config.suffixes.len(),
            separators = config.separators.len(),
            "loaded pattern config"
        );

        Ok(config)
    }

    /// Load a ruleset, treating a missing or malformed file as an empty ruleset.
    ///
    /// The failure is logged; an empty ruleset simply produces no candidates.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(tag = "ERROR", error = %e, "pattern config unusable, using empty ruleset");
                Self::default()
            }
        }
    }

    /// Separators to generate with.
    ///
    /// A ruleset without separators joins prefix and suffix directly.
    #[must_use]
    pub fn effective_separators(&self) -> Vec<String> {
        if self.separators.is_empty() {
            vec![String::new()]
        } else {
            self.separators.clone()
        }
    }

    /// Numeric-tail cap, preferring the file's value over `fallback`.
    #[must_use]
    pub fn max_variants_or(&self, fallback: u32) -> u32 {
        self.max_variants.unwrap_or(fallback)
    }
}
