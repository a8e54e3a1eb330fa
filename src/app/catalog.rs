//! Copernicus GNSS catalog source adapter
//!
//! Queries the catalog search endpoint with an OpenSearch-style query
//! string and reads product titles and download links out of the JSON
//! feed. The endpoint is public behind fixed guest credentials; there is
//! no session handling.
//!
//! Feed quirk: `feed.entry` is a JSON object when exactly one product
//! matches and an array otherwise, so both shapes are accepted. The same
//! goes for each entry's `link` element.

use reqwest::Client;
use serde_json::{Map, Value};
use url::Url;

use crate::app::models::{Mission, OrbitTier, SearchWindow};
use crate::app::source::{OrbitSource, RawCandidate};
use crate::constants::esa;
use crate::errors::{SourceError, SourceResult};

/// Maximum rows requested per catalog query
const CATALOG_ROWS: u32 = 100;

/// Timestamp format accepted by the catalog's position range filters
const CATALOG_TIME_FMT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Source adapter for the Copernicus GNSS catalog query API
pub struct CatalogSource {
    client: Client,
    search_url: Url,
}

impl CatalogSource {
    /// Create an adapter against the default catalog endpoint
    pub fn new() -> SourceResult<Self> {
        Self::with_search_url(esa::CATALOG_SEARCH_URL)
    }

    /// Create an adapter against a custom endpoint
    pub fn with_search_url(search_url: &str) -> SourceResult<Self> {
        let search_url = Url::parse(search_url).map_err(|_| SourceError::InvalidUrl {
            url: search_url.to_string(),
        })?;
        let client = crate::app::http::HttpHandler::build_client()?;
        Ok(Self { client, search_url })
    }

    /// Build the OpenSearch query string for one listing.
    ///
    /// The position ranges are open-ended on the side the validity window
    /// may extend past: a covering file starts no later than the window
    /// end and stops no earlier than the window begin, but its start can
    /// precede the whole window (restituted files span hours). Requiring
    /// both positions inside the window would exclude such files before
    /// the covering test ever sees them.
    fn build_query(mission: Mission, tier: OrbitTier, window: SearchWindow) -> String {
        let begin = window.begin.format(CATALOG_TIME_FMT);
        let end = window.end.format(CATALOG_TIME_FMT);
        format!(
            "producttype:{} platformname:Sentinel-1 filename:{}* \
             beginPosition:[* TO {end}] endPosition:[{begin} TO *]",
            tier.product_type(),
            mission.code(),
        )
    }

    /// Pull product titles and download links out of a catalog feed
    /// document
    fn parse_feed(body: &str) -> SourceResult<Vec<RawCandidate>> {
        let document: Value =
            serde_json::from_str(body).map_err(|e| SourceError::UnexpectedResponse {
                reason: format!("catalog response is not JSON: {e}"),
            })?;

        let feed = document
            .get("feed")
            .ok_or_else(|| SourceError::UnexpectedResponse {
                reason: "catalog response has no feed element".to_string(),
            })?;

        let candidates = match feed.get("entry") {
            // Single match: entry is an object, not a one-element array
            Some(Value::Object(entry)) => parse_entry(entry).into_iter().collect(),
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| entry.as_object().and_then(parse_entry))
                .collect(),
            _ => Vec::new(),
        };
        Ok(candidates)
    }
}

fn parse_entry(entry: &Map<String, Value>) -> Option<RawCandidate> {
    let title = entry.get("title").and_then(Value::as_str)?;
    match entry_link(entry) {
        Some(href) => Some(RawCandidate::with_url(title, href)),
        None => Some(RawCandidate::from_identifier(title)),
    }
}

/// The entry's download href: the `rel`-less link is the product bytes,
/// the alternative/icon links are metadata
fn entry_link(entry: &Map<String, Value>) -> Option<String> {
    let href = |link: &Map<String, Value>| -> Option<String> {
        link.get("href").and_then(Value::as_str).map(str::to_string)
    };
    match entry.get("link")? {
        Value::Object(link) => href(link),
        Value::Array(links) => {
            let links: Vec<&Map<String, Value>> =
                links.iter().filter_map(Value::as_object).collect();
            links
                .iter()
                .find(|link| !link.contains_key("rel"))
                .and_then(|link| href(link))
                .or_else(|| links.iter().find_map(|link| href(link)))
        }
        _ => None,
    }
}

impl OrbitSource for CatalogSource {
    async fn list_candidates(
        &self,
        mission: Mission,
        tier: OrbitTier,
        window: SearchWindow,
    ) -> SourceResult<Vec<RawCandidate>> {
        let query = Self::build_query(mission, tier, window);
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("rows", &CATALOG_ROWS.to_string())
            .append_pair("format", "json");

        tracing::info!("querying catalog for {tier} products: {mission}");
        let response = self
            .client
            .get(url)
            .basic_auth(esa::CATALOG_USER, Some(esa::CATALOG_PASSWORD))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 || status.is_server_error() {
            return Err(SourceError::Unavailable {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::UnexpectedResponse {
                reason: format!("catalog answered HTTP {status}"),
            });
        }

        let body = response.text().await?;
        let candidates = Self::parse_feed(&body)?;
        tracing::debug!("{} catalog entries for {mission}", candidates.len());
        Ok(candidates)
    }
}
