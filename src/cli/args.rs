//! Command-line argument parsing for the EOF fetcher
//!
//! Defines the CLI structure with clap derive macros: a `fetch` command
//! that resolves and downloads orbit files, and a `list` command that
//! resolves without downloading.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::app::Mission;

/// EOF Fetcher - download Sentinel-1 orbit ephemeris files
#[derive(Parser, Debug)]
#[command(
    name = "eof_fetcher",
    version,
    about = "Download the Sentinel-1 orbit ephemeris files covering your scenes",
    long_about = "Finds the precise (POEORB) orbit ephemeris file covering each requested \
observation, falling back to restituted (RESORB) orbits when precise ones are not yet published."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve and download orbit files
    Fetch(FetchArgs),

    /// Resolve orbit files and print them without downloading
    List(FetchArgs),
}

/// Which remote catalog to query
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Scrape the ESA auxiliary archive HTML listings
    #[default]
    EsaArchive,
    /// Query the Copernicus GNSS catalog API
    Catalog,
}

/// Arguments shared by the fetch and list commands
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Observation date/time (YYYY-MM-DD or YYYYMMDDTHHMMSS);
    /// requires --mission
    #[arg(short, long)]
    pub date: Option<String>,

    /// Mission (S1A or S1B); requires --date
    #[arg(short, long)]
    pub mission: Option<Mission>,

    /// Sentinel-1 product name to fetch the orbit for
    /// (e.g. S1A_IW_SLC__1SDV_20180420T043026_...SAFE)
    #[arg(short = 'f', long, value_name = "PRODUCT")]
    pub sentinel_file: Option<String>,

    /// Directory scanned for Sentinel-1 products when no date or product
    /// is given
    #[arg(short = 'p', long, default_value = ".", value_name = "DIR")]
    pub search_path: PathBuf,

    /// Directory to save orbit files into
    #[arg(short = 'o', long, default_value = ".", value_name = "DIR")]
    pub save_dir: PathBuf,

    /// Number of concurrent resolutions
    #[arg(short = 'w', long, default_value = "4")]
    pub workers: usize,

    /// Re-download orbit files that already exist on disk
    #[arg(long)]
    pub force: bool,

    /// Search only restituted orbits, skipping the precise tier
    #[arg(long)]
    pub restituted_only: bool,

    /// Remote catalog to query
    #[arg(long, value_enum, default_value = "esa-archive")]
    pub source: SourceKind,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl FetchArgs {
    /// Reject inconsistent argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.date.is_some() != self.mission.is_some() {
            return Err("--date and --mission must be specified together".to_string());
        }

        if self.sentinel_file.is_some() && self.date.is_some() {
            return Err("--sentinel-file cannot be combined with --date/--mission".to_string());
        }

        if self.workers == 0 {
            return Err("number of workers must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> FetchArgs {
        FetchArgs {
            date: None,
            mission: None,
            sentinel_file: None,
            search_path: PathBuf::from("."),
            save_dir: PathBuf::from("."),
            workers: 4,
            force: false,
            restituted_only: false,
            source: SourceKind::EsaArchive,
        }
    }

    #[test]
    fn date_and_mission_must_come_together() {
        let mut args = base_args();
        assert!(args.validate().is_ok());

        args.date = Some("2021-02-26".to_string());
        assert!(args.validate().is_err());

        args.mission = Some(Mission::S1A);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn sentinel_file_excludes_date() {
        let args = FetchArgs {
            sentinel_file: Some("S1A_IW_SLC__1SDV_20180420T043026_x.SAFE".to_string()),
            date: Some("2018-04-20".to_string()),
            mission: Some(Mission::S1A),
            ..base_args()
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn zero_workers_rejected() {
        let args = FetchArgs {
            workers: 0,
            ..base_args()
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn log_level_follows_flags() {
        let cli = Cli {
            global: GlobalArgs {
                verbose: false,
                very_verbose: false,
                quiet: true,
                config: None,
            },
            command: Commands::List(base_args()),
        };
        assert_eq!(cli.log_level(), tracing::Level::ERROR);

        let cli = Cli {
            global: GlobalArgs {
                verbose: true,
                very_verbose: false,
                quiet: false,
                config: None,
            },
            command: Commands::List(base_args()),
        };
        assert_eq!(cli.log_level(), tracing::Level::INFO);
    }
}
