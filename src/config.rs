//! Configuration management for the EOF fetcher
//!
//! Zero-config by default: every field has a sensible default and the
//! optional TOML file only overrides what it names. An explicitly passed
//! path must exist; the default location
//! (`<config dir>/eof_fetcher/config.toml`) is used only when present.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::ResolverConfig;
use crate::constants::{esa, margins, workers};
use crate::errors::{ConfigError, Result};

/// Application configuration, TOML-serializable
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Bounded concurrency cap for batch resolution
    pub workers: usize,
    /// ESA auxiliary archive base URL
    pub archive_base_url: String,
    /// Copernicus GNSS catalog search endpoint
    pub catalog_search_url: String,
    /// Search window half-width for precise-tier queries
    #[serde(with = "humantime_serde")]
    pub precise_margin: Duration,
    /// Search window half-width for restituted-tier queries
    #[serde(with = "humantime_serde")]
    pub restituted_margin: Duration,
    /// Interval length a selected file must contain
    #[serde(with = "humantime_serde")]
    pub coverage_interval: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            workers: workers::DEFAULT_WORKER_COUNT,
            archive_base_url: esa::ARCHIVE_BASE_URL.to_string(),
            catalog_search_url: esa::CATALOG_SEARCH_URL.to_string(),
            precise_margin: margins::PRECISE_SEARCH_MARGIN,
            restituted_margin: margins::RESTITUTED_SEARCH_MARGIN,
            coverage_interval: margins::COVERAGE_INTERVAL,
        }
    }
}

impl FetcherConfig {
    /// Load configuration from `path`, the default location, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    }
                    .into());
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("no configuration file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("eof_fetcher").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = toml::from_str(&content).map_err(ConfigError::InvalidFormat)?;
        config.validate()?;
        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.workers == 0 || self.workers > workers::MAX_WORKER_COUNT {
            return Err(ConfigError::InvalidValue {
                field: "workers".to_string(),
                reason: format!("must be in 1..={}", workers::MAX_WORKER_COUNT),
            }
            .into());
        }
        Ok(())
    }

    /// Resolver tuning derived from this configuration
    pub fn resolver_config(&self) -> Result<ResolverConfig> {
        Ok(ResolverConfig {
            max_concurrency: self.workers,
            precise_margin: to_chrono(self.precise_margin, "precise_margin")?,
            restituted_margin: to_chrono(self.restituted_margin, "restituted_margin")?,
            coverage_interval: to_chrono(self.coverage_interval, "coverage_interval")?,
        })
    }
}

fn to_chrono(duration: Duration, field: &str) -> Result<chrono::Duration> {
    chrono::Duration::from_std(duration).map_err(|_| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "duration out of range".to_string(),
        }
        .into()
    })
}
