//! Integration tests for batch orbit resolution
//!
//! Exercises the full pipeline end to end against an in-memory source:
//! listing, parsing, deduplication, straddling filter, covering
//! selection, and the precise -> restituted fallback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};

use eof_fetcher::app::{
    Mission, OrbitResolver, OrbitSource, OrbitTier, RawCandidate, ResolutionRequest,
    ResolverConfig, SearchWindow,
};
use eof_fetcher::errors::{SourceError, SourceResult};

/// In-memory source serving fixed listings per (mission, tier), counting
/// how often each tier is asked
struct FixtureSource {
    listings: HashMap<(Mission, OrbitTier), Vec<String>>,
    precise_queries: AtomicUsize,
    restituted_queries: AtomicUsize,
}

impl FixtureSource {
    fn new() -> Self {
        Self {
            listings: HashMap::new(),
            precise_queries: AtomicUsize::new(0),
            restituted_queries: AtomicUsize::new(0),
        }
    }

    fn with_listing(mut self, mission: Mission, tier: OrbitTier, ids: &[&str]) -> Self {
        self.listings.insert(
            (mission, tier),
            ids.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

impl OrbitSource for FixtureSource {
    async fn list_candidates(
        &self,
        mission: Mission,
        tier: OrbitTier,
        _window: SearchWindow,
    ) -> SourceResult<Vec<RawCandidate>> {
        match tier {
            OrbitTier::Precise => self.precise_queries.fetch_add(1, Ordering::SeqCst),
            OrbitTier::Restituted => self.restituted_queries.fetch_add(1, Ordering::SeqCst),
        };
        match self.listings.get(&(mission, tier)) {
            Some(ids) => Ok(ids
                .iter()
                .map(|id| RawCandidate::from_identifier(id.as_str()))
                .collect()),
            None => Err(SourceError::Unavailable { status: 404 }),
        }
    }
}

fn s1a_request(y: i32, mo: u32, d: u32) -> ResolutionRequest {
    ResolutionRequest::new(Mission::S1A, Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap())
}

#[tokio::test]
async fn full_pipeline_picks_newest_straddling_cover() {
    // A realistic archive listing: same-day reprocessed variants listed
    // adjacently, a republished window with a newer creation time, and a
    // file for the neighboring day.
    let source = FixtureSource::new().with_listing(
        Mission::S1A,
        OrbitTier::Precise,
        &[
            "S1A_OPER_AUX_POEORB_OPOD_20210310T121945_V20210225T225942_20210227T005942.EOF",
            // Adjacent same-day variant: collapsed by deduplication
            "S1A_OPER_AUX_POEORB_OPOD_20210310T151945_V20210225T235942_20210227T015942.EOF",
            // Neighboring day: rejected by the straddling filter
            "S1A_OPER_AUX_POEORB_OPOD_20210311T121945_V20210226T225942_20210228T005942.EOF",
            // Republished duplicate of the first window, newer creation
            "S1A_OPER_AUX_POEORB_OPOD_20210315T121945_V20210225T225942_20210227T005942.EOF",
        ],
    );

    let resolver = OrbitResolver::new(source);
    let request = s1a_request(2021, 2, 26);
    let outcome = resolver
        .resolve_batch(vec![request], OrbitTier::Precise)
        .await;

    assert!(outcome.is_complete());
    let picked = &outcome.resolved[&request];
    assert_eq!(picked.tier, OrbitTier::Precise);
    assert_eq!(
        picked.filename(),
        "S1A_OPER_AUX_POEORB_OPOD_20210315T121945_V20210225T225942_20210227T005942.EOF"
    );
}

#[tokio::test]
async fn missing_precise_listing_escalates_to_restituted() {
    // No precise listing at all (HTTP 404): the resolver must treat it
    // as empty and try the restituted tier.
    let source = FixtureSource::new().with_listing(
        Mission::S1A,
        OrbitTier::Restituted,
        &["S1A_OPER_AUX_RESORB_OPOD_20210226T021945_V20210225T230000_20210226T013000.EOF"],
    );

    let resolver = OrbitResolver::new(source);
    let request = s1a_request(2021, 2, 26);
    let outcome = resolver
        .resolve_batch(vec![request], OrbitTier::Precise)
        .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.resolved[&request].tier, OrbitTier::Restituted);
}

#[tokio::test]
async fn both_tiers_missing_is_reported_per_request() {
    let source = FixtureSource::new();
    let resolver = OrbitResolver::new(source);

    let request = s1a_request(2021, 2, 26);
    let outcome = resolver
        .resolve_batch(vec![request], OrbitTier::Precise)
        .await;

    assert!(outcome.resolved.is_empty());
    assert_eq!(outcome.unresolved.len(), 1);
    assert_eq!(outcome.unresolved[0].request, request);
}

#[tokio::test]
async fn batch_requests_resolve_independently() {
    // Feb 26 has a precise file; Feb 20 has nothing anywhere. The second
    // request's failure must not disturb the first.
    let source = FixtureSource::new()
        .with_listing(
            Mission::S1A,
            OrbitTier::Precise,
            &["S1A_OPER_AUX_POEORB_OPOD_20210310T121945_V20210225T225942_20210227T005942.EOF"],
        )
        .with_listing(Mission::S1A, OrbitTier::Restituted, &[]);

    let resolver = OrbitResolver::with_config(
        source,
        ResolverConfig {
            max_concurrency: 2,
            ..ResolverConfig::default()
        },
    );

    let covered = s1a_request(2021, 2, 26);
    let uncovered = s1a_request(2021, 2, 20);
    let outcome = resolver
        .resolve_batch(vec![covered, uncovered], OrbitTier::Precise)
        .await;

    assert_eq!(outcome.resolved.len(), 1);
    assert!(outcome.resolved.contains_key(&covered));
    assert_eq!(outcome.unresolved.len(), 1);
    assert_eq!(outcome.unresolved[0].request, uncovered);
}

#[tokio::test]
async fn restituted_preference_never_queries_precise() {
    let source = FixtureSource::new().with_listing(
        Mission::S1B,
        OrbitTier::Restituted,
        &["S1B_OPER_AUX_RESORB_OPOD_20200701T042318_V20200630T233000_20200701T013000.EOF"],
    );

    let request = ResolutionRequest::new(
        Mission::S1B,
        Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap(),
    );

    // Borrowing the source keeps the query counters inspectable after
    // the batch completes.
    let resolver = OrbitResolver::new(&source);
    let outcome = resolver
        .resolve_batch(vec![request], OrbitTier::Restituted)
        .await;

    assert!(outcome.is_complete());
    assert_eq!(source.precise_queries.load(Ordering::SeqCst), 0);
    assert_eq!(source.restituted_queries.load(Ordering::SeqCst), 1);
}
