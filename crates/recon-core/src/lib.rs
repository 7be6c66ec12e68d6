//! Recon Core - Foundation crate for the Recon account scanner.
//!
//! This crate provides shared record types, error handling and configuration
//! management that all other Recon crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Account records shared by the lookup client, registry and scanner
//!
//! # Example
//!
//! ```rust
//! use recon_core::AppConfig;
//!
//! let config = AppConfig::default();
//! assert_eq!(config.scanning.max_variants, 50);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, LookupConfig, PathsConfig, ScanningConfig};
pub use error::{ConfigError, ConfigResult, ReconError, Result};
pub use types::{AccountRecord, ResolvedAccount};
