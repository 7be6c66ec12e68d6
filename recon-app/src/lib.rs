//! Recon application shell.
//!
//! This is the thin binary layer that loads configuration, initialises logging
//! and dispatches subcommands. Core logic lives in the `crates/` directory.

mod cli;
pub mod commands;

pub use cli::{Cli, Command};

use anyhow::Context;
use recon_core::AppConfig;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,recon_scanner=debug,recon_lookup=debug";

/// Load the config file (explicit path or platform default) and apply env overrides.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::load().context("failed to load default config")?,
    };

    config
        .apply_env_overrides()
        .context("invalid environment override")
}

/// Initialize tracing subscriber for logging.
///
/// Console output goes to stderr so stdout stays clean for command output.
/// With `log_file`, every line is also appended to that file without ANSI colors.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;

            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .try_init()
        .context("failed to initialise logging")?;

    Ok(())
}

/// Execute the parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run { once } => {
            init_tracing(Some(&config.paths.log_file))?;
            info!("Starting recon v{}", env!("CARGO_PKG_VERSION"));
            commands::run_scan(&config, once).await
        }
        Command::Candidates => {
            init_tracing(None)?;
            for candidate in commands::candidate_list(&config)? {
                println!("{candidate}");
            }
            Ok(())
        }
        Command::Findings => {
            init_tracing(None)?;
            println!("{}", commands::findings_json(&config)?);
            Ok(())
        }
    }
}
