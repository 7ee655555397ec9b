use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

mod commands;
mod tool;
mod utils;

use commands::*;
use tool::GpgTool;

#[derive(Parser)]
#[command(version, about = "CLI for inspecting GnuPG keys, cards and signing-key custody")]
struct Cli {
    /// Path to the gpg binary (default: gpg on PATH)
    #[arg(long, default_value = "gpg")]
    gpg: PathBuf,

    /// Timeout for gpg invocations, in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Trace level output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List secret keys with keygrips and fingerprints
    Keys {
        /// Limit the listing to one primary key fingerprint
        #[arg(long)]
        primary: Option<String>,
    },

    /// List signing-capable keys
    Signing,

    /// Show the inserted card and its resident keys
    Card,

    /// Resolve the single best signing key
    Exact,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    let tool = GpgTool::new(cli.gpg, Duration::from_secs(cli.timeout));

    match &cli.command {
        Commands::Keys { primary } => list_keys_command(&tool, primary.as_deref()).await?,
        Commands::Signing => list_signing_command(&tool).await?,
        Commands::Card => card_info_command(&tool).await?,
        Commands::Exact => exact_command(&tool).await?,
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(true)
        .init();
}
