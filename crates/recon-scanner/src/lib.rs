//! Recon Scanner - the continuous scan loop.
//!
//! The [`ScanOrchestrator`] drives one cycle after another:
//! authenticate, generate candidates, scan them one at a time, cool down.
//! Scanning is strictly sequential with a fixed pacing delay between lookups;
//! that delay is the only throttle against the lookup service's rate limit.
//!
//! # Features
//!
//! - Cooperative shutdown through a [`tokio_util::sync::CancellationToken`],
//!   honored between candidates and during every wait
//! - Fixed backoff after authentication failures, rate limits and cycle failures
//! - Suspects are persisted the moment they are found
//! - A failed or panicking cycle is logged and restarted, never fatal
//!
//! # Example
//!
//! ```rust,ignore
//! use recon_scanner::ScanOrchestrator;
//! use std::sync::Arc;
//!
//! let orchestrator = ScanOrchestrator::new(&config, Arc::new(helix_client));
//! let cancel = orchestrator.cancellation_token();
//! tokio::spawn(async move {
//!     tokio::signal::ctrl_c().await.ok();
//!     cancel.cancel();
//! });
//! orchestrator.run().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cycle;
pub mod error;
pub mod orchestrator;
pub mod policy;

// Re-export commonly used types
pub use cycle::{CycleReport, CycleState, ScanState};
pub use error::{Result, ScanError};
pub use orchestrator::{CyclePlan, ScanOrchestrator};
pub use policy::BackoffPolicy;
