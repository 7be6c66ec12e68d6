//! Recon Registry - persistent record of confirmed suspects.
//!
//! The registry is the only writer of the findings store, a JSON array of
//! `{username, id, display_name, checked_at}` objects that the dashboard reads.
//! Every append rewrites the whole collection through a temporary file and an
//! atomic rename, so a crash leaves either the previous or the new collection
//! on disk, never a partial one.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod store;

pub use error::{RegistryError, Result};
pub use store::{read_findings, Registry};
