//! Source adapter interface
//!
//! A source adapter supplies raw orbit-product listings for a mission,
//! tier and search window. The resolver distinguishes two failure classes:
//! [`SourceError::Unavailable`] means "no data for this window, escalate
//! to the next tier"; everything else means "could not ask" and fails the
//! request instead of being silently treated as empty.

use std::future::Future;

use crate::app::models::{Mission, OrbitTier, SearchWindow};
use crate::errors::SourceResult;

/// One raw listing entry returned by a source adapter
///
/// The identifier carries the descriptor fields (it may be a bare product
/// name or an absolute URL). Catalog-style sources name products one way
/// and serve their bytes from another URL, so the fetchable location is
/// carried separately when the identifier alone is not it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    /// Product identifier carrying the descriptor fields
    pub identifier: String,
    /// URL the product bytes can be fetched from, when it differs from
    /// the identifier
    pub download_url: Option<String>,
}

impl RawCandidate {
    /// Entry whose identifier is itself the fetchable location (or a
    /// bare name with no known location)
    pub fn from_identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            download_url: None,
        }
    }

    /// Entry with a separate download location
    pub fn with_url(identifier: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            download_url: Some(url.into()),
        }
    }
}

/// Supplier of raw orbit-product listings
///
/// Implemented by the ESA archive scraper and the catalog query client.
/// Listing is read-only; adapters own their timeouts.
pub trait OrbitSource: Send + Sync {
    /// List raw entries for products of the given mission and tier whose
    /// publication falls inside `window`.
    ///
    /// The caller parses and re-filters the identifiers, so over-listing
    /// is acceptable.
    fn list_candidates(
        &self,
        mission: Mission,
        tier: OrbitTier,
        window: SearchWindow,
    ) -> impl Future<Output = SourceResult<Vec<RawCandidate>>> + Send;
}

impl<S: OrbitSource> OrbitSource for &S {
    fn list_candidates(
        &self,
        mission: Mission,
        tier: OrbitTier,
        window: SearchWindow,
    ) -> impl Future<Output = SourceResult<Vec<RawCandidate>>> + Send {
        (*self).list_candidates(mission, tier, window)
    }
}
