//! Candidate deduplication, window filtering, and covering selection
//!
//! Pure functions over parsed candidates; no I/O. The orchestrator chains
//! them per tier: dedupe the server listing, filter precise candidates to
//! the expected straddling window, then pick the best-covering file.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::app::models::OrbitCandidate;
use crate::errors::SelectionError;

/// Collapse adjacent same-day candidates from a server listing.
///
/// Always keeps the first candidate; each subsequent candidate is kept
/// only if its validity-start date (day granularity) differs from the
/// last *kept* candidate's. The archive lists same-day reprocessed
/// variants adjacently, so a linear scan against the last kept element is
/// sufficient; non-adjacent same-day duplicates are intentionally left
/// alone rather than collapsed with a general group-by.
pub fn dedupe_adjacent(candidates: Vec<OrbitCandidate>) -> Vec<OrbitCandidate> {
    let mut kept: Vec<OrbitCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match kept.last() {
            Some(prev) if prev.validity_start_date() == candidate.validity_start_date() => {}
            _ => kept.push(candidate),
        }
    }
    kept
}

/// Keep only candidates whose validity window straddles `target_date` by
/// exactly one day on each side.
///
/// Precise orbit files are published with a fixed ±1-day margin around the
/// day they cover; anything not following that pattern is excluded
/// outright as unreliable for the requested day. Restituted candidates
/// never pass through this filter: their margins vary and coverage is
/// checked by [`select_covering`] alone.
pub fn filter_straddling(
    candidates: Vec<OrbitCandidate>,
    target_date: NaiveDate,
) -> Vec<OrbitCandidate> {
    candidates
        .into_iter()
        .filter(|c| {
            c.validity_start.date_naive() == target_date - Duration::days(1)
                && c.validity_stop.date_naive() == target_date + Duration::days(1)
        })
        .collect()
}

/// Pick the candidate whose validity window fully contains `[t0, t1]`.
///
/// Two phases, preserved exactly: full containment is required (partial
/// overlap is never acceptable), then the most recently created file wins
/// among covering candidates, since it is presumed more authoritative.
///
/// # Errors
///
/// Returns [`SelectionError::NoCoverage`] when no candidate contains the
/// interval, an expected outcome the orchestrator catches to fall back
/// to the next tier.
pub fn select_covering(
    t0: DateTime<Utc>,
    t1: DateTime<Utc>,
    candidates: Vec<OrbitCandidate>,
) -> Result<OrbitCandidate, SelectionError> {
    let mut covering: Vec<OrbitCandidate> = candidates
        .into_iter()
        .filter(|c| c.covers(t0, t1))
        .collect();

    if covering.is_empty() {
        return Err(SelectionError::NoCoverage { t0, t1 });
    }

    covering.sort_by(|a, b| b.creation_time.cmp(&a.creation_time));
    Ok(covering.remove(0))
}
