use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "recon",
    version,
    about = "Continuously scans for accounts whose names match suspicious patterns",
    long_about = "recon enumerates candidate usernames from a pattern file, resolves them against the \
                  Twitch Helix API and records every existing account whose name contains a \
                  prefix+suffix pattern in a JSON findings store."
)]
pub struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Scan continuously until interrupted
    Run {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Print the validated candidates for the current pattern file without looking them up
    Candidates,

    /// Print the findings store as a JSON array
    Findings,
}
