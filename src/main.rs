//! EOF Fetcher CLI application
//!
//! Command-line interface for downloading Sentinel-1 orbit ephemeris
//! files, with precise -> restituted fallback and concurrent batch
//! resolution.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use eof_fetcher::cli::{handle_fetch, handle_list, Cli, Commands};
use eof_fetcher::config::FetcherConfig;
use eof_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(&cli);
    info!("EOF Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    let config = FetcherConfig::load(cli.global.config.as_deref())?;

    match cli.command {
        Commands::Fetch(args) => {
            info!("executing fetch command");
            handle_fetch(args, config).await
        }
        Commands::List(args) => {
            info!("executing list command");
            handle_list(args, config).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("eof_fetcher={log_level}").parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();
}
