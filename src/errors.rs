//! Error types for the EOF fetcher
//!
//! Errors are grouped per subsystem so that the orchestrator can react to
//! each kind differently: malformed identifiers are dropped, missing
//! coverage drives the tier fallback, and transport failures are surfaced
//! to the caller instead of being swallowed.

use std::path::PathBuf;

use thiserror::Error;

/// Orbit identifier parsing errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// Identifier does not follow the ESA EOF naming scheme
    #[error("malformed orbit identifier: {identifier}")]
    MalformedIdentifier { identifier: String },

    /// Unknown mission code (expected S1A or S1B)
    #[error("unknown mission code: {code}")]
    UnknownMission { code: String },

    /// Unknown orbit product type marker
    #[error("unknown orbit product type: {marker}")]
    UnknownProductType { marker: String },

    /// A fixed-format timestamp field failed to parse
    #[error("invalid timestamp field '{field}' in {identifier}")]
    InvalidTimestamp { field: String, identifier: String },

    /// Validity window violates start < stop
    #[error("empty validity window in {identifier}")]
    EmptyValidityWindow { identifier: String },
}

/// Candidate selection errors
#[derive(Error, Debug)]
pub enum SelectionError {
    /// No candidate fully contains the requested interval.
    ///
    /// A normal, expected outcome: the orchestrator consumes it to drive
    /// the precise -> restituted fallback. It is never surfaced from
    /// `resolve_batch`.
    #[error("no candidate covers the interval [{t0}, {t1}]")]
    NoCoverage {
        t0: chrono::DateTime<chrono::Utc>,
        t1: chrono::DateTime<chrono::Utc>,
    },
}

/// Source adapter errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source answered but has no data for the window (HTTP 404/5xx).
    /// Interpreted as "treat as empty, escalate to the next tier".
    #[error("source has no data for this window: HTTP {status}")]
    Unavailable { status: u16 },

    /// Connectivity failure: we could not ask the source at all.
    /// Propagated per request, never silently treated as empty.
    #[error("source transport failure")]
    Transport(#[from] reqwest::Error),

    /// Response body was not in the expected shape
    #[error("unexpected response from source: {reason}")]
    UnexpectedResponse { reason: String },

    /// Invalid URL constructed for the source query
    #[error("invalid source URL: {url}")]
    InvalidUrl { url: String },
}

impl SourceError {
    /// "No data" outcomes escalate to the next tier; everything else
    /// fails the request.
    pub fn is_no_data(&self) -> bool {
        matches!(self, SourceError::Unavailable { .. })
    }
}

/// Download and file-writing errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request failed
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status for the product URL
    #[error("server error: HTTP {status} for {url}")]
    ServerError { status: u16, url: String },

    /// I/O error writing the EOF file
    #[error("file I/O error: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The candidate's source identifier is not a fetchable URL
    #[error("candidate has no downloadable URL: {source_id}")]
    NotDownloadable { source_id: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// I/O error reading configuration
    #[error("I/O error reading configuration")]
    Io(#[from] std::io::Error),
}

/// Top-level application error that can represent any subsystem error
#[derive(Error, Debug)]
pub enum AppError {
    /// Identifier parsing error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Selection error
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Source adapter error
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Parse(_) => "parse",
            AppError::Selection(_) => "selection",
            AppError::Source(_) => "source",
            AppError::Download(_) => "download",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Parse result type alias
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Source result type alias
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;
