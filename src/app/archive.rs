//! ESA auxiliary archive source adapter
//!
//! The archive at `aux.sentinel1.eo.esa.int` organizes orbit files by
//! *creation* date: `/{POEORB|RESORB}/{YYYY}/{MM}/{DD}/` is an HTML
//! directory listing with relative `<a>` links to the `.EOF` files created
//! that day. Since we search by observation time, the listing day is
//! derived from the window midpoint plus the tier's typical publication
//! latency (~20.5 days for precise, ~4 hours for restituted).

use chrono::Duration;
use scraper::{Html, Selector};
use url::Url;

use crate::app::http::HttpHandler;
use crate::app::models::{Mission, OrbitTier, SearchWindow};
use crate::app::source::{OrbitSource, RawCandidate};
use crate::constants::{esa, http, margins, selectors};
use crate::errors::{SourceError, SourceResult};

/// Source adapter scraping the ESA auxiliary data archive listings
pub struct EsaArchiveSource {
    http: HttpHandler,
    base_url: Url,
}

impl EsaArchiveSource {
    /// Create an adapter against the default archive endpoint
    pub fn new() -> SourceResult<Self> {
        Self::with_base_url(esa::ARCHIVE_BASE_URL)
    }

    /// Create an adapter against a custom endpoint (primarily for tests
    /// and mirrors)
    pub fn with_base_url(base_url: &str) -> SourceResult<Self> {
        let base_url = Url::parse(base_url).map_err(|_| SourceError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        let client = HttpHandler::build_client()?;
        Ok(Self {
            http: HttpHandler::new(client, http::ARCHIVE_RATE_LIMIT_RPS),
            base_url,
        })
    }

    /// Listing page URL for the creation day implied by the search window
    fn listing_url(&self, tier: OrbitTier, window: SearchWindow) -> SourceResult<Url> {
        let listing_day = window.midpoint() + publication_offset(tier);
        let path = format!(
            "{}/{}/",
            tier.archive_segment(),
            listing_day.format(esa::ARCHIVE_DATE_FMT)
        );
        self.base_url
            .join(&path)
            .map_err(|_| SourceError::InvalidUrl { url: path })
    }

    /// Extract EOF links for `mission` from a listing page body.
    ///
    /// Links on the page are relative, so they are resolved against the
    /// listing URL to produce absolute, fetchable identifiers.
    fn extract_links(page: &str, listing_url: &Url, mission: Mission) -> SourceResult<Vec<String>> {
        let document = Html::parse_document(page);
        let selector = Selector::parse(selectors::EOF_LINK_SELECTOR).map_err(|e| {
            SourceError::UnexpectedResponse {
                reason: format!("invalid EOF link selector: {e}"),
            }
        })?;

        let mut links = Vec::new();
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let name = href.rsplit('/').next().unwrap_or(href);
            if !name.starts_with(mission.code()) {
                continue;
            }
            match listing_url.join(href) {
                Ok(absolute) => links.push(absolute.to_string()),
                Err(_) => {
                    tracing::warn!("skipping unjoinable archive link: {href}");
                }
            }
        }
        Ok(links)
    }
}

impl OrbitSource for EsaArchiveSource {
    async fn list_candidates(
        &self,
        mission: Mission,
        tier: OrbitTier,
        window: SearchWindow,
    ) -> SourceResult<Vec<RawCandidate>> {
        let url = self.listing_url(tier, window)?;
        tracing::info!("searching for {tier} orbit files at {url}");

        let page = self.http.get_page(&url).await?;
        let links = Self::extract_links(&page, &url, mission)?;
        tracing::debug!("{} {tier} links listed for {mission}", links.len());
        // Archive links are themselves the fetchable locations
        Ok(links.into_iter().map(RawCandidate::from_identifier).collect())
    }
}

/// Typical delay between the covered epoch and the file's creation day
fn publication_offset(tier: OrbitTier) -> Duration {
    let std_offset = match tier {
        OrbitTier::Precise => margins::PRECISE_PUBLICATION_OFFSET,
        OrbitTier::Restituted => margins::RESTITUTED_PUBLICATION_OFFSET,
    };
    Duration::from_std(std_offset).unwrap_or_else(|_| Duration::zero())
}
