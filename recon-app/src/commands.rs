//! Subcommand implementations.

use anyhow::Context;
use recon_core::{AppConfig, ReconError};
use recon_lookup::{Credentials, HelixClient};
use recon_patterns::{generate_bounded, is_valid, PatternConfig};
use recon_registry::read_findings;
use recon_scanner::ScanOrchestrator;
use std::sync::Arc;
use tracing::info;

/// Run the scan loop (or a single cycle) against the Twitch Helix API.
///
/// Ctrl-C cancels the loop cooperatively: it stops between candidates or
/// during whatever wait is in progress.
pub async fn run_scan(config: &AppConfig, once: bool) -> anyhow::Result<()> {
    let credentials =
        Credentials::from_env(&config.lookup.client_id_env, &config.lookup.client_secret_env)?;
    let client = HelixClient::new(&config.lookup, credentials)?;
    let orchestrator = ScanOrchestrator::new(config, Arc::new(client));

    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping");
            cancel.cancel();
        }
    });

    if once {
        orchestrator
            .run_once()
            .await
            .context("scan cycle failed")?;
    } else {
        orchestrator.run().await;
    }

    Ok(())
}

/// Candidates the next cycle would send to the lookup service.
///
/// Unlike the scan loop, an unreadable pattern file is reported instead of
/// being treated as empty.
pub fn candidate_list(config: &AppConfig) -> recon_core::Result<Vec<String>> {
    let patterns = PatternConfig::load(&config.paths.patterns_file)?;
    let candidates = generate_bounded(
        &patterns,
        config.scanning.max_variants,
        config.scanning.max_candidates,
    )?;

    let total = candidates.len();
    let valid: Vec<String> = candidates.into_iter().filter(|c| is_valid(c)).collect();
    info!(total, valid = valid.len(), "generated candidates");

    Ok(valid)
}

/// The findings store as pretty-printed JSON, exactly as a dashboard serves it.
pub fn findings_json(config: &AppConfig) -> recon_core::Result<String> {
    let records = read_findings(&config.paths.findings_file)?;
    serde_json::to_string_pretty(&records).map_err(|e| ReconError::Internal(e.to_string()))
}
