//! Configuration management for Recon.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The resulting [`AppConfig`] is built once
//! at startup and handed to the scanner; nothing reads it from globals.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/recon/config.toml` (or platform equivalent)
/// unless an explicit path is given. Missing sections and fields fall back
/// to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input and output file locations
    pub paths: PathsConfig,
    /// Scan loop pacing and limits
    pub scanning: ScanningConfig,
    /// Identity lookup service settings
    pub lookup: LookupConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_or_default(&config_path)
    }

    /// Load configuration from `path`, falling back to defaults if the file doesn't exist.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or is not valid TOML.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path that must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `RECON_PATTERNS_FILE`, `RECON_FINDINGS_FILE`, `RECON_LOG_FILE`: override paths
    /// - `RECON_MAX_VARIANTS`: override the default numeric-tail cap
    /// - `RECON_REQUEST_DELAY_MS`: override the pacing delay between lookups
    /// - `RECON_CYCLE_COOLDOWN_SECS`: override the delay between cycles
    ///
    /// # Errors
    /// Returns `InvalidValue` if a numeric override does not parse.
    pub fn apply_env_overrides(mut self) -> ConfigResult<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(val) = lookup("RECON_PATTERNS_FILE") {
            tracing::debug!("Override paths.patterns_file from env: {}", val);
            self.paths.patterns_file = PathBuf::from(val);
        }

        if let Some(val) = lookup("RECON_FINDINGS_FILE") {
            tracing::debug!("Override paths.findings_file from env: {}", val);
            self.paths.findings_file = PathBuf::from(val);
        }

        if let Some(val) = lookup("RECON_LOG_FILE") {
            tracing::debug!("Override paths.log_file from env: {}", val);
            self.paths.log_file = PathBuf::from(val);
        }

        if let Some(val) = lookup("RECON_MAX_VARIANTS") {
            self.scanning.max_variants = parse_override("RECON_MAX_VARIANTS", &val)?;
            tracing::debug!(
                "Override scanning.max_variants from env: {}",
                self.scanning.max_variants
            );
        }

        if let Some(val) = lookup("RECON_REQUEST_DELAY_MS") {
            self.scanning.request_delay_ms = parse_override("RECON_REQUEST_DELAY_MS", &val)?;
            tracing::debug!(
                "Override scanning.request_delay_ms from env: {}",
                self.scanning.request_delay_ms
            );
        }

        if let Some(val) = lookup("RECON_CYCLE_COOLDOWN_SECS") {
            self.scanning.cycle_cooldown_secs = parse_override("RECON_CYCLE_COOLDOWN_SECS", &val)?;
            tracing::debug!(
                "Override scanning.cycle_cooldown_secs from env: {}",
                self.scanning.cycle_cooldown_secs
            );
        }

        Ok(())
    }

    /// Save configuration to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the default configuration file.
    ///
    /// Uses XDG base directories: `~/.config/recon/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "recon", "recon").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn parse_override<T: std::str::FromStr>(field: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("'{value}' is not a valid number"),
    })
}

/// Input and output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Pattern ruleset (JSON), re-read at the start of every cycle
    pub patterns_file: PathBuf,
    /// Findings store (JSON array) read by the dashboard
    pub findings_file: PathBuf,
    /// Append-only log file
    pub log_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            patterns_file: PathBuf::from("patterns.json"),
            findings_file: PathBuf::from("suspects").join("suspects.json"),
            log_file: PathBuf::from("twitchrecon.log"),
        }
    }
}

/// Scan loop pacing and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Numeric-tail cap used when the pattern file does not set `max_variants`
    pub max_variants: u32,
    /// Upper bound on candidates per cycle; larger pattern sets are rejected
    pub max_candidates: u64,
    /// Delay between two lookups in milliseconds
    pub request_delay_ms: u64,
    /// Delay between cycles in seconds
    pub cycle_cooldown_secs: u64,
    /// Delay before retrying a failed authentication in seconds
    pub auth_retry_secs: u64,
    /// Pause after a rate-limited lookup in seconds
    pub rate_limit_backoff_secs: u64,
    /// Ceiling for a rate-limit pause when the service sends a reset hint
    pub max_rate_limit_backoff_secs: u64,
    /// Pause after an unexpected cycle failure in seconds
    pub failure_backoff_secs: u64,
}

impl ScanningConfig {
    /// Pacing delay between lookups.
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Delay between cycles.
    #[must_use]
    pub fn cycle_cooldown(&self) -> Duration {
        Duration::from_secs(self.cycle_cooldown_secs)
    }

    /// Delay before retrying authentication.
    #[must_use]
    pub fn auth_retry(&self) -> Duration {
        Duration::from_secs(self.auth_retry_secs)
    }

    /// Base pause after a rate-limited lookup.
    #[must_use]
    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_secs(self.rate_limit_backoff_secs)
    }

    /// Ceiling for rate-limit pauses.
    #[must_use]
    pub fn max_rate_limit_backoff(&self) -> Duration {
        Duration::from_secs(self.max_rate_limit_backoff_secs)
    }

    /// Pause after an unexpected cycle failure.
    #[must_use]
    pub fn failure_backoff(&self) -> Duration {
        Duration::from_secs(self.failure_backoff_secs)
    }
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            max_variants: 50,
            max_candidates: 100_000,
            request_delay_ms: 1000,
            cycle_cooldown_secs: 300,
            auth_retry_secs: 120,
            rate_limit_backoff_secs: 60,
            max_rate_limit_backoff_secs: 900,
            failure_backoff_secs: 60,
        }
    }
}

/// Identity lookup service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// OAuth client-credentials token endpoint
    pub token_url: String,
    /// User lookup endpoint
    pub users_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
    /// Environment variable holding the client id
    pub client_id_env: String,
    /// Environment variable holding the client secret
    pub client_secret_env: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            token_url: "https://id.twitch.tv/oauth2/token".to_string(),
            users_url: "https://api.twitch.tv/helix/users".to_string(),
            timeout_secs: 30,
            user_agent: concat!("recon/", env!("CARGO_PKG_VERSION")).to_string(),
            client_id_env: "CLIENT_ID".to_string(),
            client_secret_env: "CLIENT_SECRET".to_string(),
        }
    }
}
