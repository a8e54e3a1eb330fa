//! Rate-limited HTTP operations shared by the source adapters
//!
//! Wraps a `reqwest::Client` with a direct rate limiter so that archive
//! listing requests stay polite. Retry and backoff are deliberately absent:
//! transient failures surface as transport errors and the caller decides.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::Client;
use url::Url;

use crate::constants::http;
use crate::errors::{SourceError, SourceResult};

/// HTTP operations handler with client-side rate limiting
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpHandler {
    /// Create a handler around an existing client
    ///
    /// `rate_limit_rps` of zero falls back to one request per second.
    pub fn new(client: Client, rate_limit_rps: u32) -> Self {
        let rps = NonZeroU32::new(rate_limit_rps).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rps));
        Self {
            client,
            rate_limiter,
        }
    }

    /// Build the default client used by the source adapters
    pub fn build_client() -> SourceResult<Client> {
        let client = Client::builder()
            .user_agent(http::USER_AGENT)
            .timeout(http::DEFAULT_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .build()?;
        Ok(client)
    }

    /// Fetch a URL, returning the raw response
    ///
    /// Non-success statuses are not an error here; the adapters map them
    /// to their own availability semantics.
    pub async fn get_response(&self, url: &Url) -> SourceResult<reqwest::Response> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;

        let response = self.client.get(url.as_str()).send().await?;
        tracing::debug!("fetched {} -> HTTP {}", url, response.status());
        Ok(response)
    }

    /// Fetch a page body as text, mapping 404 and 5xx to `Unavailable`
    pub async fn get_page(&self, url: &Url) -> SourceResult<String> {
        let response = self.get_response(url).await?;
        let status = response.status();
        if status.as_u16() == 404 || status.is_server_error() {
            return Err(SourceError::Unavailable {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::UnexpectedResponse {
                reason: format!("HTTP {status} for {url}"),
            });
        }
        Ok(response.text().await?)
    }

    /// Access the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
