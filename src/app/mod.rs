//! Core application logic for the EOF fetcher
//!
//! Contains the orbit candidate model, the pure selection functions, the
//! tiered resolution orchestrator, and the source adapters that list
//! candidates from the ESA archive or the Copernicus GNSS catalog.
//!
//! # Examples
//!
//! ```rust,no_run
//! use chrono::{TimeZone, Utc};
//! use eof_fetcher::app::{
//!     EsaArchiveSource, Mission, OrbitResolver, OrbitTier, ResolutionRequest,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = EsaArchiveSource::new()?;
//! let resolver = OrbitResolver::new(source);
//!
//! let request = ResolutionRequest::new(
//!     Mission::S1A,
//!     Utc.with_ymd_and_hms(2021, 2, 26, 0, 0, 0).unwrap(),
//! );
//! let outcome = resolver.resolve_batch(vec![request], OrbitTier::Precise).await;
//! if let Some(candidate) = outcome.resolved.get(&request) {
//!     println!("best orbit file: {}", candidate.filename());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod catalog;
pub mod download;
pub mod http;
pub mod models;
pub mod resolver;
pub mod scan;
pub mod selection;
pub mod source;

// Re-export the main public API
pub use archive::EsaArchiveSource;
pub use catalog::CatalogSource;
pub use download::save_candidate;
pub use models::{CoverageRequest, Mission, OrbitCandidate, OrbitTier, SceneId, SearchWindow};
pub use resolver::{
    BatchOutcome, FailureReason, OrbitResolver, ResolutionRequest, ResolverConfig, Unresolved,
};
pub use scan::{existing_orbits, scan_scenes, without_covered};
pub use selection::{dedupe_adjacent, filter_straddling, select_covering};
pub use source::{OrbitSource, RawCandidate};
