//! Application constants for the EOF fetcher
//!
//! Centralizes the values used throughout the application, organized by
//! functional domain.

use std::time::Duration;

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "EOF-Fetcher/0.1.0 (SAR Processing Tool)";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Archive request rate limit (requests per second)
    pub const ARCHIVE_RATE_LIMIT_RPS: u32 = 5;
}

/// ESA service URLs and endpoints
pub mod esa {
    /// ESA auxiliary data archive base URL.
    /// Listing pages live at `{BASE}/{POEORB|RESORB}/{YYYY}/{MM}/{DD}/`
    /// and contain relative links to the .EOF files created on that day.
    pub const ARCHIVE_BASE_URL: &str = "http://aux.sentinel1.eo.esa.int";

    /// Copernicus GNSS catalog search endpoint (JSON feed)
    pub const CATALOG_SEARCH_URL: &str = "https://scihub.copernicus.eu/gnss/search/";

    /// Guest credentials for the GNSS catalog (public, fixed)
    pub const CATALOG_USER: &str = "gnssguest";
    pub const CATALOG_PASSWORD: &str = "gnssguest";

    /// Date path format for archive listing URLs
    pub const ARCHIVE_DATE_FMT: &str = "%Y/%m/%d";

    /// Fixed-format timestamp used in EOF identifiers
    pub const EOF_TIMESTAMP_FMT: &str = "%Y%m%dT%H%M%S";
}

/// Search margins and publication-latency offsets
pub mod margins {
    use super::Duration;

    /// Search window half-width around the observation time for
    /// precise-tier queries (precise files appear ~20.5 days after the
    /// covered epoch)
    pub const PRECISE_SEARCH_MARGIN: Duration = Duration::from_secs((20 * 24 + 12) * 3600);

    /// Search window half-width for restituted-tier queries
    pub const RESTITUTED_SEARCH_MARGIN: Duration = Duration::from_secs(3600);

    /// Offset from observation time to the archive listing day for
    /// precise files (creation-date based listing)
    pub const PRECISE_PUBLICATION_OFFSET: Duration = Duration::from_secs((20 * 24 + 12) * 3600);

    /// Offset from observation time to the archive listing day for
    /// restituted files
    pub const RESTITUTED_PUBLICATION_OFFSET: Duration = Duration::from_secs(4 * 3600);

    /// Length of the interval that a selected file must fully contain,
    /// starting at the observation time
    pub const COVERAGE_INTERVAL: Duration = Duration::from_secs(60);
}

/// Web scraping CSS selectors
pub mod selectors {
    /// CSS selector for EOF product links in archive listing pages
    pub const EOF_LINK_SELECTOR: &str = "a[href$='.EOF']";
}

/// Worker and concurrency configuration
pub mod workers {
    /// Default number of concurrent resolutions in a batch
    pub const DEFAULT_WORKER_COUNT: usize = 4;

    /// Maximum recommended concurrent resolutions
    pub const MAX_WORKER_COUNT: usize = 20;
}

/// File operation constants
pub mod files {
    /// Extension of orbit ephemeris products
    pub const EOF_EXTENSION: &str = "EOF";

    /// Prefix shared by all Sentinel-1 product names
    pub const SENTINEL_PREFIX: &str = "S1";
}

// Re-export commonly used constants for convenience
pub use esa::{ARCHIVE_BASE_URL, CATALOG_SEARCH_URL, EOF_TIMESTAMP_FMT};
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use workers::DEFAULT_WORKER_COUNT;
