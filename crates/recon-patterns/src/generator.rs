//! Candidate enumeration.
//!
//! For each prefix `p` the generator emits `p`, `p0..p{n-1}`, and for every
//! suffix `s` and separator `sep` the string `p + sep + s` followed by its own
//! numeric tails. Output is a `BTreeSet`, so ordering is lexicographic and
//! overlapping inputs can never produce duplicates.

use crate::error::{PatternError, Result};
use crate::PatternConfig;
use std::collections::BTreeSet;

/// Generate every candidate for the given ruleset.
///
/// Pure and deterministic: identical inputs always produce the identical set.
#[must_use]
pub fn generate(
    prefixes: &BTreeSet<String>,
    suffixes: &BTreeSet<String>,
    separators: &[String],
    max_variants: u32,
) -> BTreeSet<String> {
    let mut candidates = BTreeSet::new();

    for prefix in prefixes {
        push_with_tails(&mut candidates, prefix.clone(), max_variants);

        for suffix in suffixes {
            for sep in separators {
                push_with_tails(&mut candidates, format!("{prefix}{sep}{suffix}"), max_variants);
            }
        }
    }

    candidates
}

fn push_with_tails(candidates: &mut BTreeSet<String>, base: String, max_variants: u32) {
    for i in 0..max_variants {
        candidates.insert(format!("{base}{i}"));
    }
    candidates.insert(base);
}

/// Upper bound on `generate`'s output size.
///
/// `|prefixes| * (1 + n + |suffixes| * |separators| * (1 + n))`, saturating
/// instead of overflowing.
#[must_use]
pub fn candidate_bound(
    prefixes: usize,
    suffixes: usize,
    separators: usize,
    max_variants: u32,
) -> u64 {
    let per_base = 1u64.saturating_add(u64::from(max_variants));
    let combos = (suffixes as u64)
        .saturating_mul(separators as u64)
        .saturating_mul(per_base);

    (prefixes as u64).saturating_mul(per_base.saturating_add(combos))
}

/// Generate candidates for a ruleset, refusing rulesets whose bound exceeds `limit`.
///
/// Uses the ruleset's effective separators and `default_max_variants` when the
/// ruleset doesn't set its own cap.
///
/// # Errors
/// Returns `TooManyCandidates` without generating anything if the bound is too large.
pub fn generate_bounded(
    config: &PatternConfig,
    default_max_variants: u32,
    limit: u64,
) -> Result<BTreeSet<String>> {
    let separators = config.effective_separators();
    let max_variants = config.max_variants_or(default_max_variants);

    let bound = candidate_bound(
        config.prefixes.len(),
        config.suffixes.len(),
        separators.len(),
        max_variants,
    );
    if bound > limit {
        return Err(PatternError::TooManyCandidates { bound, limit });
    }

    Ok(generate(
        &config.prefixes,
        &config.suffixes,
        &separators,
        max_variants,
    ))
}
