//! Recon Lookup - resolving candidate usernames against the identity service.
//!
//! The scanner only ever sees the [`LookupClient`] trait and its tagged
//! outcomes. "Not found" and "rate limited" are ordinary values, not errors,
//! so callers handle every case with an exhaustive `match`.
//!
//! [`HelixClient`] implements the trait against the Twitch Helix API using an
//! OAuth client-credentials token.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod client;
pub mod credentials;
pub mod error;
pub mod helix;

pub use client::{AccessToken, LookupClient, LookupOutcome};
pub use credentials::Credentials;
pub use error::{AuthFailure, LookupError, Result};
pub use helix::HelixClient;
