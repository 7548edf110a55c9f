//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check_key;
mod list;
mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use copyrot::config::Settings;

#[derive(Parser)]
#[command(name = "copyrot")]
#[command(about = "Find websites whose footer copyright year has gone stale")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Scan every target: capture, read the footer year, classify and archive
    Scan {
        /// Target list, one URL per line (default: TARGETS or config)
        #[arg(short, long)]
        targets: Option<PathBuf>,
        /// Process at most this many targets
        #[arg(short, long)]
        limit: Option<usize>,
        /// Keep the target list order instead of shuffling
        #[arg(long)]
        no_shuffle: bool,
        /// Skip archive submissions for stale sites
        #[arg(long)]
        no_proof: bool,
    },

    /// Validate the capture service access key and exit
    CheckKey,

    /// List stored site records
    List {
        /// Only show sites with this status (ok, stale, future, inconclusive)
        #[arg(short, long)]
        status: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parse arguments, load settings and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Scan {
            targets,
            limit,
            no_shuffle,
            no_proof,
        } => {
            let options = scan::ScanOptions {
                targets,
                limit,
                shuffle: !no_shuffle,
                proofs: !no_proof,
            };
            scan::cmd_scan(&settings, options).await
        }
        Commands::CheckKey => check_key::cmd_check_key(&settings).await,
        Commands::List { status, json } => list::cmd_list(&settings, status.as_deref(), json),
    }
}
