//! Tiered orbit resolution orchestrator
//!
//! Drives the precise -> restituted fallback cascade per (mission,
//! observation-time) request. Each request walks a small state machine:
//!
//! ```text
//! Resolving(Precise) --no data--> Resolving(Restituted) --no data--> Failed
//!        |                               |
//!        +---------- Succeeded <---------+
//! ```
//!
//! Requests in a batch resolve independently on a bounded concurrent
//! stream; results are keyed by request identity so the outcome never
//! depends on completion order, and one request's failure never aborts
//! the others.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};

use crate::app::models::{CoverageRequest, Mission, OrbitCandidate, OrbitTier};
use crate::app::selection::{dedupe_adjacent, filter_straddling, select_covering};
use crate::app::source::{OrbitSource, RawCandidate};
use crate::constants::workers;
use crate::errors::SourceError;

/// One (mission, observation-time) pair to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolutionRequest {
    pub mission: Mission,
    pub time: DateTime<Utc>,
}

impl ResolutionRequest {
    pub fn new(mission: Mission, time: DateTime<Utc>) -> Self {
        Self { mission, time }
    }
}

impl fmt::Display for ResolutionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.mission, self.time)
    }
}

/// Why a request could not be resolved
#[derive(Debug)]
pub enum FailureReason {
    /// Both tiers were searched and neither produced a covering file
    TiersExhausted,
    /// The source could not be asked (transport or protocol failure);
    /// the underlying cause is attached rather than swallowed
    Source(SourceError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::TiersExhausted => {
                f.write_str("no covering orbit file in any tier")
            }
            FailureReason::Source(e) => write!(f, "source failure: {e}"),
        }
    }
}

/// A request that could not be covered by any tier
#[derive(Debug)]
pub struct Unresolved {
    pub request: ResolutionRequest,
    pub reason: FailureReason,
}

/// Aggregated outcome of a batch resolution
///
/// Best-effort contract: unresolved requests are reported here, never
/// thrown, so a caller inspecting only `resolved` silently skips them.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Selected candidate per request, keyed by request identity
    pub resolved: HashMap<ResolutionRequest, OrbitCandidate>,
    /// Requests no tier could cover, with the cause attached
    pub unresolved: Vec<Unresolved>,
}

impl BatchOutcome {
    /// True when every request in the batch resolved
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Per-request state of the fallback cascade
#[derive(Debug)]
enum ResolveState {
    Resolving(OrbitTier),
    Succeeded(OrbitCandidate),
    Failed(FailureReason),
}

/// Outcome of a single tier attempt
enum TierOutcome {
    Selected(OrbitCandidate),
    /// Empty listing, no straddling match, no covering match, or the
    /// source reported "no data"; all of these escalate to the next tier
    NoData,
    Fatal(SourceError),
}

/// Tuning knobs for the resolver
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Bounded concurrency cap for batch resolution
    pub max_concurrency: usize,
    /// Search window half-width for precise-tier listings
    pub precise_margin: Duration,
    /// Search window half-width for restituted-tier listings
    pub restituted_margin: Duration,
    /// Length of the interval a selected file must contain, starting at
    /// the observation time
    pub coverage_interval: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrency: workers::DEFAULT_WORKER_COUNT,
            // Precise files appear ~20.5 days after the covered epoch
            precise_margin: Duration::days(20) + Duration::hours(12),
            restituted_margin: Duration::hours(1),
            coverage_interval: Duration::minutes(1),
        }
    }
}

/// Orchestrator for tiered batch resolution against one source adapter
pub struct OrbitResolver<S> {
    source: S,
    config: ResolverConfig,
}

impl<S: OrbitSource> OrbitResolver<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, ResolverConfig::default())
    }

    pub fn with_config(source: S, config: ResolverConfig) -> Self {
        let config = ResolverConfig {
            max_concurrency: config.max_concurrency.max(1),
            ..config
        };
        Self { source, config }
    }

    /// Resolve a whole batch, best-effort.
    ///
    /// `preferred_tier` of [`OrbitTier::Restituted`] skips the precise
    /// stage entirely; the default cascade starts at precise.
    pub async fn resolve_batch(
        &self,
        requests: Vec<ResolutionRequest>,
        preferred_tier: OrbitTier,
    ) -> BatchOutcome {
        let results: Vec<(ResolutionRequest, Result<OrbitCandidate, FailureReason>)> =
            stream::iter(requests)
                .map(|request| async move {
                    (request, self.resolve_one(request, preferred_tier).await)
                })
                .buffer_unordered(self.config.max_concurrency)
                .collect()
                .await;

        let mut outcome = BatchOutcome::default();
        for (request, result) in results {
            match result {
                Ok(candidate) => {
                    tracing::info!("resolved {request} -> {}", candidate.filename());
                    outcome.resolved.insert(request, candidate);
                }
                Err(reason) => {
                    tracing::warn!("unresolved {request}: {reason}");
                    outcome.unresolved.push(Unresolved { request, reason });
                }
            }
        }
        outcome
    }

    /// Run the fallback cascade for one request
    async fn resolve_one(
        &self,
        request: ResolutionRequest,
        preferred_tier: OrbitTier,
    ) -> Result<OrbitCandidate, FailureReason> {
        let mut state = ResolveState::Resolving(preferred_tier);
        loop {
            state = match state {
                ResolveState::Resolving(tier) => match self.attempt_tier(request, tier).await {
                    TierOutcome::Selected(candidate) => ResolveState::Succeeded(candidate),
                    TierOutcome::NoData => match tier {
                        OrbitTier::Precise => {
                            tracing::warn!(
                                "no precise orbit covers {request}, falling back to restituted"
                            );
                            ResolveState::Resolving(OrbitTier::Restituted)
                        }
                        OrbitTier::Restituted => {
                            ResolveState::Failed(FailureReason::TiersExhausted)
                        }
                    },
                    TierOutcome::Fatal(e) => ResolveState::Failed(FailureReason::Source(e)),
                },
                ResolveState::Succeeded(candidate) => return Ok(candidate),
                ResolveState::Failed(reason) => return Err(reason),
            };
        }
    }

    /// One tier of the cascade: list, parse, dedupe, filter, select
    async fn attempt_tier(&self, request: ResolutionRequest, tier: OrbitTier) -> TierOutcome {
        let coverage = CoverageRequest {
            mission: request.mission,
            tier,
            t0: request.time,
            t1: request.time + self.config.coverage_interval,
            search_margin: match tier {
                OrbitTier::Precise => self.config.precise_margin,
                OrbitTier::Restituted => self.config.restituted_margin,
            },
        };

        let raw = match self
            .source
            .list_candidates(coverage.mission, tier, coverage.search_window())
            .await
        {
            Ok(raw) => raw,
            Err(e) if e.is_no_data() => {
                tracing::warn!("{tier} source unavailable for {request}: {e}");
                return TierOutcome::NoData;
            }
            Err(e) => return TierOutcome::Fatal(e),
        };

        let candidates = self.parse_listing(raw, &coverage);
        let mut candidates = dedupe_adjacent(candidates);
        if tier == OrbitTier::Precise {
            candidates = filter_straddling(candidates, request.time.date_naive());
        }

        match select_covering(coverage.t0, coverage.t1, candidates) {
            Ok(candidate) => TierOutcome::Selected(candidate),
            Err(e) => {
                tracing::debug!("{tier} selection failed for {request}: {e}");
                TierOutcome::NoData
            }
        }
    }

    /// Parse raw listing entries, dropping malformed ones and products
    /// for other missions or tiers with a diagnostic. An entry's separate
    /// download location, when present, becomes the candidate's source id
    /// so the selected product stays fetchable.
    fn parse_listing(
        &self,
        raw: Vec<RawCandidate>,
        coverage: &CoverageRequest,
    ) -> Vec<OrbitCandidate> {
        raw.into_iter()
            .filter_map(|entry| match OrbitCandidate::parse(&entry.identifier) {
                Ok(mut candidate)
                    if candidate.mission == coverage.mission && candidate.tier == coverage.tier =>
                {
                    if let Some(url) = entry.download_url {
                        candidate.source_id = url;
                    }
                    Some(candidate)
                }
                Ok(candidate) => {
                    tracing::debug!(
                        "skipping {} ({} {}), wanted {} {}",
                        candidate.filename(),
                        candidate.mission,
                        candidate.tier,
                        coverage.mission,
                        coverage.tier,
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!("dropping candidate: {e}");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::SearchWindow;
    use crate::errors::SourceResult;
    use chrono::{Datelike, TimeZone};

    /// Mock source returning canned listings per tier
    struct StaticSource {
        precise: SourceResult<Vec<String>>,
        restituted: SourceResult<Vec<String>>,
    }

    impl StaticSource {
        fn ok(precise: Vec<&str>, restituted: Vec<&str>) -> Self {
            Self {
                precise: Ok(precise.into_iter().map(String::from).collect()),
                restituted: Ok(restituted.into_iter().map(String::from).collect()),
            }
        }
    }

    fn clone_result(r: &SourceResult<Vec<String>>) -> SourceResult<Vec<String>> {
        match r {
            Ok(v) => Ok(v.clone()),
            Err(SourceError::Unavailable { status }) => {
                Err(SourceError::Unavailable { status: *status })
            }
            Err(SourceError::UnexpectedResponse { reason }) => Err(SourceError::UnexpectedResponse {
                reason: reason.clone(),
            }),
            Err(_) => unreachable!("tests only use cloneable variants"),
        }
    }

    impl OrbitSource for StaticSource {
        async fn list_candidates(
            &self,
            _mission: Mission,
            tier: OrbitTier,
            _window: SearchWindow,
        ) -> SourceResult<Vec<RawCandidate>> {
            let listing = match tier {
                OrbitTier::Precise => clone_result(&self.precise),
                OrbitTier::Restituted => clone_result(&self.restituted),
            }?;
            Ok(listing
                .into_iter()
                .map(RawCandidate::from_identifier)
                .collect())
        }
    }

    fn request_s1a(y: i32, mo: u32, d: u32) -> ResolutionRequest {
        ResolutionRequest::new(
            Mission::S1A,
            Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap(),
        )
    }

    const PRECISE_FEB26: &str =
        "S1A_OPER_AUX_POEORB_OPOD_20210310T121945_V20210225T225942_20210227T005942.EOF";
    const PRECISE_FEB26_NEWER: &str =
        "S1A_OPER_AUX_POEORB_OPOD_20210315T121945_V20210225T225942_20210227T005942.EOF";
    const RESTITUTED_FEB26: &str =
        "S1A_OPER_AUX_RESORB_OPOD_20210226T021945_V20210225T230000_20210226T013000.EOF";

    #[tokio::test]
    async fn resolves_precise_candidate() {
        let source = StaticSource::ok(vec![PRECISE_FEB26], vec![]);
        let resolver = OrbitResolver::new(source);

        let request = request_s1a(2021, 2, 26);
        let outcome = resolver.resolve_batch(vec![request], OrbitTier::Precise).await;

        assert!(outcome.is_complete());
        let picked = &outcome.resolved[&request];
        assert_eq!(picked.tier, OrbitTier::Precise);
        assert_eq!(picked.filename(), PRECISE_FEB26);
    }

    #[tokio::test]
    async fn newer_republication_wins() {
        let source = StaticSource::ok(vec![PRECISE_FEB26_NEWER, PRECISE_FEB26], vec![]);
        let resolver = OrbitResolver::new(source);

        let request = request_s1a(2021, 2, 26);
        let outcome = resolver.resolve_batch(vec![request], OrbitTier::Precise).await;
        // Same coverage, creation 20210315 beats 20210310
        assert_eq!(outcome.resolved[&request].filename(), PRECISE_FEB26_NEWER);
    }

    #[tokio::test]
    async fn empty_precise_listing_falls_back_to_restituted() {
        let source = StaticSource::ok(vec![], vec![RESTITUTED_FEB26]);
        let resolver = OrbitResolver::new(source);

        let request = request_s1a(2021, 2, 26);
        let outcome = resolver.resolve_batch(vec![request], OrbitTier::Precise).await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.resolved[&request].tier, OrbitTier::Restituted);
    }

    #[tokio::test]
    async fn precise_unavailable_source_falls_back() {
        let source = StaticSource {
            precise: Err(SourceError::Unavailable { status: 404 }),
            restituted: Ok(vec![RESTITUTED_FEB26.to_string()]),
        };
        let resolver = OrbitResolver::new(source);

        let request = request_s1a(2021, 2, 26);
        let outcome = resolver.resolve_batch(vec![request], OrbitTier::Precise).await;
        assert_eq!(outcome.resolved[&request].tier, OrbitTier::Restituted);
    }

    #[tokio::test]
    async fn non_straddling_precise_file_is_rejected_not_selected() {
        // Covers the interval but starts on the target day - 2: fails the
        // straddling filter, so the restituted tier is used instead.
        let wide_precise =
            "S1A_OPER_AUX_POEORB_OPOD_20210310T121945_V20210224T225942_20210227T005942.EOF";
        let source = StaticSource::ok(vec![wide_precise], vec![RESTITUTED_FEB26]);
        let resolver = OrbitResolver::new(source);

        let request = request_s1a(2021, 2, 26);
        let outcome = resolver.resolve_batch(vec![request], OrbitTier::Precise).await;
        assert_eq!(outcome.resolved[&request].tier, OrbitTier::Restituted);
    }

    #[tokio::test]
    async fn restituted_preference_skips_precise_stage() {
        // Precise listing would be fatal if queried
        let source = StaticSource {
            precise: Err(SourceError::UnexpectedResponse {
                reason: "must not be queried".to_string(),
            }),
            restituted: Ok(vec![RESTITUTED_FEB26.to_string()]),
        };
        let resolver = OrbitResolver::new(source);

        let request = request_s1a(2021, 2, 26);
        let outcome = resolver
            .resolve_batch(vec![request], OrbitTier::Restituted)
            .await;
        assert!(outcome.is_complete());
        assert_eq!(outcome.resolved[&request].tier, OrbitTier::Restituted);
    }

    #[tokio::test]
    async fn exhausted_tiers_reported_not_thrown() {
        let source = StaticSource::ok(vec![], vec![]);
        let resolver = OrbitResolver::new(source);

        let request = request_s1a(2021, 2, 26);
        let outcome = resolver.resolve_batch(vec![request], OrbitTier::Precise).await;

        assert!(outcome.resolved.is_empty());
        assert_eq!(outcome.unresolved.len(), 1);
        assert!(matches!(
            outcome.unresolved[0].reason,
            FailureReason::TiersExhausted
        ));
    }

    #[tokio::test]
    async fn malformed_listing_entries_are_dropped() {
        let source = StaticSource::ok(
            vec!["garbage.html", PRECISE_FEB26, "S1A_checksums.md5"],
            vec![],
        );
        let resolver = OrbitResolver::new(source);

        let request = request_s1a(2021, 2, 26);
        let outcome = resolver.resolve_batch(vec![request], OrbitTier::Precise).await;
        assert_eq!(outcome.resolved[&request].filename(), PRECISE_FEB26);
    }

    /// Source serving catalog-style entries: bare titles with separate
    /// download locations
    struct LinkedSource;

    impl OrbitSource for LinkedSource {
        async fn list_candidates(
            &self,
            _mission: Mission,
            tier: OrbitTier,
            _window: SearchWindow,
        ) -> SourceResult<Vec<RawCandidate>> {
            match tier {
                OrbitTier::Precise => Ok(vec![RawCandidate::with_url(
                    PRECISE_FEB26.strip_suffix(".EOF").unwrap(),
                    "https://scihub.copernicus.eu/gnss/odata/v1/Products('aaa')/$value",
                )]),
                OrbitTier::Restituted => Ok(vec![]),
            }
        }
    }

    #[tokio::test]
    async fn separate_download_location_becomes_source_id() {
        let resolver = OrbitResolver::new(LinkedSource);

        let request = request_s1a(2021, 2, 26);
        let outcome = resolver.resolve_batch(vec![request], OrbitTier::Precise).await;

        // The product downloads from the catalog URL but keeps its own
        // name for the file on disk
        let picked = &outcome.resolved[&request];
        assert_eq!(
            picked.source_id,
            "https://scihub.copernicus.eu/gnss/odata/v1/Products('aaa')/$value"
        );
        assert_eq!(picked.filename(), PRECISE_FEB26);
    }

    /// Source that fails fatally for one specific request time
    struct FlakySource {
        poison_day: u32,
    }

    impl OrbitSource for FlakySource {
        async fn list_candidates(
            &self,
            _mission: Mission,
            tier: OrbitTier,
            window: SearchWindow,
        ) -> SourceResult<Vec<RawCandidate>> {
            if window.midpoint().date_naive().day0() + 1 == self.poison_day {
                return Err(SourceError::UnexpectedResponse {
                    reason: "connection reset".to_string(),
                });
            }
            match tier {
                OrbitTier::Precise => Ok(vec![]),
                OrbitTier::Restituted => Ok(vec![RawCandidate::from_identifier(format!(
                    "S1A_OPER_AUX_RESORB_OPOD_20210226T021945_V202102{:02}T000000_202102{:02}T020000.EOF",
                    window.midpoint().date_naive().day0() + 1,
                    window.midpoint().date_naive().day0() + 1,
                ))]),
            }
        }
    }

    #[tokio::test]
    async fn one_transport_failure_does_not_abort_the_batch() {
        let resolver = OrbitResolver::new(FlakySource { poison_day: 25 });

        let requests = vec![
            request_s1a(2021, 2, 24),
            request_s1a(2021, 2, 25),
            request_s1a(2021, 2, 26),
        ];
        let outcome = resolver
            .resolve_batch(requests.clone(), OrbitTier::Precise)
            .await;

        assert_eq!(outcome.resolved.len(), 2);
        assert!(outcome.resolved.contains_key(&requests[0]));
        assert!(outcome.resolved.contains_key(&requests[2]));

        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(outcome.unresolved[0].request, requests[1]);
        assert!(matches!(
            outcome.unresolved[0].reason,
            FailureReason::Source(SourceError::UnexpectedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn results_are_keyed_by_request_identity() {
        let source = StaticSource::ok(vec![PRECISE_FEB26], vec![]);
        let resolver = OrbitResolver::with_config(
            source,
            ResolverConfig {
                max_concurrency: 8,
                ..ResolverConfig::default()
            },
        );

        // Duplicate identical requests collapse onto the same key
        let request = request_s1a(2021, 2, 26);
        let outcome = resolver
            .resolve_batch(vec![request, request, request], OrbitTier::Precise)
            .await;
        assert_eq!(outcome.resolved.len(), 1);
        assert!(outcome.resolved.contains_key(&request));
    }
}
