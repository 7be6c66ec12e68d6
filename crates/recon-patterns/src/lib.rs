//! Recon Patterns - turning naming rules into candidates and verdicts.
//!
//! Everything in this crate is pure and synchronous:
//!
//! - [`config`] - the pattern ruleset file (`patterns.json`)
//! - [`generator`] - deterministic, duplicate-free candidate enumeration
//! - [`validator`] - syntactic filter applied before any lookup
//! - [`classifier`] - the prefix+suffix substring rule that marks suspects
//!
//! # Example
//!
//! ```rust
//! use recon_patterns::{generate, is_suspect, is_valid};
//! use std::collections::BTreeSet;
//!
//! let prefixes = BTreeSet::from(["test".to_string()]);
//! let suffixes = BTreeSet::from(["sex".to_string()]);
//! let candidates = generate(&prefixes, &suffixes, &[String::new()], 2);
//!
//! assert!(candidates.contains("testsex1"));
//! assert!(candidates.iter().all(|c| is_valid(c)));
//! assert!(is_suspect("xxtestsexxx", &prefixes, &suffixes));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod generator;
pub mod validator;

// Re-export commonly used types
pub use classifier::{is_suspect, Classifier};
pub use config::PatternConfig;
pub use error::{PatternError, Result};
pub use generator::{candidate_bound, generate, generate_bounded};
pub use validator::{is_valid, validate, Rejection, MAX_USERNAME_LEN};
