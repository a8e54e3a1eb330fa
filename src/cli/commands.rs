//! Command handlers for the EOF fetcher CLI
//!
//! Builds the batch of resolution requests from the arguments (explicit
//! date, a Sentinel product name, or a directory scan), runs the resolver
//! against the chosen source, and reports the outcome. Unresolved
//! requests are reported, not fatal: only setup and argument errors exit
//! non-zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{info, warn};

use crate::app::{
    existing_orbits, save_candidate, scan_scenes, without_covered, BatchOutcome, CatalogSource,
    EsaArchiveSource, Mission, OrbitCandidate, OrbitResolver, OrbitSource, OrbitTier,
    RawCandidate, ResolutionRequest, SceneId, SearchWindow,
};
use crate::cli::args::{FetchArgs, SourceKind};
use crate::config::FetcherConfig;
use crate::constants::esa;
use crate::errors::{AppError, Result, SourceResult};

/// Handle the `fetch` command: resolve and download
pub async fn handle_fetch(args: FetchArgs, config: FetcherConfig) -> Result<()> {
    let outcome = resolve(&args, &config).await?;

    let client = crate::app::http::HttpHandler::build_client().map_err(AppError::Source)?;
    let mut saved = 0usize;
    for candidate in outcome.resolved.values() {
        match save_candidate(&client, candidate, &args.save_dir, args.force).await {
            Ok(path) => {
                saved += 1;
                info!("orbit file ready: {}", path.display());
            }
            Err(e) => {
                warn!("failed to save {}: {e}", candidate.filename());
            }
        }
    }

    report(&outcome);
    println!("{saved} orbit file(s) saved to {}", args.save_dir.display());
    Ok(())
}

/// Handle the `list` command: resolve and print, no downloads
pub async fn handle_list(args: FetchArgs, config: FetcherConfig) -> Result<()> {
    let outcome = resolve(&args, &config).await?;

    for (request, candidate) in sorted_resolutions(&outcome) {
        println!("{request} -> {}", candidate.source_id);
    }
    report(&outcome);
    Ok(())
}

/// Resolved entries in chronological request order, for stable output
fn sorted_resolutions(outcome: &BatchOutcome) -> Vec<(&ResolutionRequest, &OrbitCandidate)> {
    let mut entries: Vec<_> = outcome.resolved.iter().collect();
    entries.sort_by_key(|(request, _)| (request.time, request.mission.code()));
    entries
}

/// Shared resolve path for both commands
async fn resolve(args: &FetchArgs, config: &FetcherConfig) -> Result<BatchOutcome> {
    args.validate().map_err(AppError::generic)?;

    let requests = build_requests(args)?;
    if requests.is_empty() {
        info!(
            "no Sentinel-1 products found in {}, nothing to do",
            args.search_path.display()
        );
        return Ok(BatchOutcome::default());
    }
    info!("resolving orbit files for {} request(s)", requests.len());

    let preferred_tier = if args.restituted_only {
        OrbitTier::Restituted
    } else {
        OrbitTier::Precise
    };

    let mut resolver_config = config.resolver_config()?;
    resolver_config.max_concurrency = args.workers;

    let source = build_source(args.source, config)?;
    let resolver = OrbitResolver::with_config(source, resolver_config);
    Ok(resolver.resolve_batch(requests, preferred_tier).await)
}

/// Assemble the batch from the argument combination
fn build_requests(args: &FetchArgs) -> Result<Vec<ResolutionRequest>> {
    if let Some(product) = &args.sentinel_file {
        let scene = SceneId::parse(product)?;
        return Ok(vec![ResolutionRequest::new(scene.mission, scene.start_time)]);
    }

    if let (Some(date), Some(mission)) = (&args.date, args.mission) {
        let time = parse_datetime(date)?;
        return Ok(vec![ResolutionRequest::new(mission, time)]);
    }

    // No explicit target: scan the search path, skipping scenes whose
    // orbit file is already in the save directory
    let requests = scan_scenes(&args.search_path)?;
    if args.force {
        return Ok(requests);
    }
    let existing = existing_orbits(&args.save_dir);
    Ok(without_covered(requests, &existing))
}

/// Accept `YYYY-MM-DD` (midnight) or the compact `YYYYMMDDTHHMMSS`
fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::generic(format!("invalid date: {input}")))?;
        return Ok(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, esa::EOF_TIMESTAMP_FMT) {
        return Ok(naive.and_utc());
    }
    Err(AppError::generic(format!(
        "unrecognized date format: {input} (expected YYYY-MM-DD or YYYYMMDDTHHMMSS)"
    )))
}

/// Print the batch summary, unresolved requests last
fn report(outcome: &BatchOutcome) {
    for unresolved in &outcome.unresolved {
        println!(
            "unresolved: {} ({})",
            unresolved.request, unresolved.reason
        );
    }
    if !outcome.is_complete() {
        warn!(
            "{} request(s) could not be resolved by any tier",
            outcome.unresolved.len()
        );
    }
}

/// Concrete source selected at runtime
///
/// The resolver is generic over its source, so the two adapters are
/// wrapped in an enum instead of a trait object.
enum AnySource {
    Archive(EsaArchiveSource),
    Catalog(CatalogSource),
}

impl OrbitSource for AnySource {
    async fn list_candidates(
        &self,
        mission: Mission,
        tier: OrbitTier,
        window: SearchWindow,
    ) -> SourceResult<Vec<RawCandidate>> {
        match self {
            AnySource::Archive(source) => source.list_candidates(mission, tier, window).await,
            AnySource::Catalog(source) => source.list_candidates(mission, tier, window).await,
        }
    }
}

fn build_source(kind: SourceKind, config: &FetcherConfig) -> Result<AnySource> {
    let source = match kind {
        SourceKind::EsaArchive => {
            AnySource::Archive(EsaArchiveSource::with_base_url(&config.archive_base_url)?)
        }
        SourceKind::Catalog => {
            AnySource::Catalog(CatalogSource::with_search_url(&config.catalog_search_url)?)
        }
    };
    Ok(source)
}
