//! Data models for orbit ephemeris products
//!
//! Defines the mission and orbit-tier enums, the parsed orbit candidate
//! descriptor, and the scene identifier used to derive batch requests from
//! Sentinel-1 product names.
//!
//! An EOF identifier looks like:
//!
//! ```text
//! S1A_OPER_AUX_POEORB_OPOD_20210318T121438_V20210225T225942_20210227T005942.EOF
//! ```
//!
//! where `S1A` is the mission, `OPER` the file class, `AUX_POEORB` the
//! product type (precise orbit; `AUX_RESORB` for restituted), `OPOD` the
//! originating site, followed by the creation timestamp and the
//! `V`-prefixed validity start/stop timestamps.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::esa::EOF_TIMESTAMP_FMT;
use crate::errors::{ParseError, ParseResult};

/// Sentinel-1 satellite platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mission {
    /// Sentinel-1A
    S1A,
    /// Sentinel-1B
    S1B,
}

impl Mission {
    /// Mission code as it appears in product identifiers
    pub fn code(&self) -> &'static str {
        match self {
            Mission::S1A => "S1A",
            Mission::S1B => "S1B",
        }
    }
}

impl FromStr for Mission {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "S1A" => Ok(Mission::S1A),
            "S1B" => Ok(Mission::S1B),
            _ => Err(ParseError::UnknownMission {
                code: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Quality tier of an orbit ephemeris product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitTier {
    /// Precise orbit ephemerides (POEORB), published ~3 weeks after the
    /// covered epoch
    Precise,
    /// Restituted orbit ephemerides (RESORB), published within hours,
    /// used as fallback
    Restituted,
}

impl OrbitTier {
    /// Path segment used by the ESA archive listing
    /// (e.g. `POEORB` in `/POEORB/2021/03/18/`)
    pub fn archive_segment(&self) -> &'static str {
        match self {
            OrbitTier::Precise => "POEORB",
            OrbitTier::Restituted => "RESORB",
        }
    }

    /// Product type string used by the catalog query API
    pub fn product_type(&self) -> &'static str {
        match self {
            OrbitTier::Precise => "AUX_POEORB",
            OrbitTier::Restituted => "AUX_RESORB",
        }
    }

    /// Parse the tier marker from an identifier (e.g. `POEORB`)
    pub fn from_marker(marker: &str) -> ParseResult<Self> {
        match marker {
            "POEORB" => Ok(OrbitTier::Precise),
            "RESORB" => Ok(OrbitTier::Restituted),
            _ => Err(ParseError::UnknownProductType {
                marker: marker.to_string(),
            }),
        }
    }
}

impl fmt::Display for OrbitTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbitTier::Precise => f.write_str("precise"),
            OrbitTier::Restituted => f.write_str("restituted"),
        }
    }
}

/// One orbit ephemeris product available for retrieval
///
/// Constructed transiently per query by parsing a raw identifier returned
/// by a source adapter; discarded after selection. Many candidates may
/// describe overlapping or identical validity windows when the archive has
/// re-published a window under a newer creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitCandidate {
    /// Satellite platform this product applies to
    pub mission: Mission,
    /// Quality tier (precise or restituted)
    pub tier: OrbitTier,
    /// Start of the validity window
    pub validity_start: DateTime<Utc>,
    /// End of the validity window (always after `validity_start`)
    pub validity_stop: DateTime<Utc>,
    /// When the product file was created; the tie-breaker between
    /// candidates with identical coverage
    pub creation_time: DateTime<Utc>,
    /// Opaque identifier usable by a source adapter to fetch bytes
    /// (an absolute URL for archive-listed products)
    pub source_id: String,
    /// Product filename as parsed from the identifier, normalized to the
    /// `.EOF` extension; independent of where the bytes live
    pub filename: String,
}

impl OrbitCandidate {
    /// Parse an orbit product identifier into a candidate descriptor
    ///
    /// Accepts a bare identifier, a full URL (only the final path segment
    /// is inspected), and identifiers with or without the `.EOF`
    /// extension. The full input string is retained as `source_id`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` when the identifier does not match the EOF
    /// naming scheme or when the validity window is empty.
    pub fn parse(identifier: &str) -> ParseResult<Self> {
        let name = identifier.rsplit('/').next().unwrap_or(identifier);

        let malformed = || ParseError::MalformedIdentifier {
            identifier: name.to_string(),
        };

        let fields: Vec<&str> = name.split('_').collect();
        // S1A _ OPER _ AUX _ POEORB _ OPOD _ <created> _ V<start> _ <stop>[.EOF]
        if fields.len() != 8 || fields[1] != "OPER" || fields[2] != "AUX" {
            return Err(malformed());
        }

        let mission = Mission::from_str(fields[0])?;
        let tier = OrbitTier::from_marker(fields[3])?;

        let creation_time = parse_timestamp(fields[5], "creation", name)?;
        let start_field = fields[6].strip_prefix('V').ok_or_else(malformed)?;
        let validity_start = parse_timestamp(start_field, "validity_start", name)?;
        let stop_field = fields[7].strip_suffix(".EOF").unwrap_or(fields[7]);
        let validity_stop = parse_timestamp(stop_field, "validity_stop", name)?;

        if validity_start >= validity_stop {
            return Err(ParseError::EmptyValidityWindow {
                identifier: name.to_string(),
            });
        }

        let filename = if name.ends_with(".EOF") {
            name.to_string()
        } else {
            format!("{name}.EOF")
        };

        Ok(OrbitCandidate {
            mission,
            tier,
            validity_start,
            validity_stop,
            creation_time,
            source_id: identifier.to_string(),
            filename,
        })
    }

    /// Product filename, used as the on-disk name when saving
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Whether the validity window fully contains `[t0, t1]`
    /// (containment, not overlap)
    pub fn covers(&self, t0: DateTime<Utc>, t1: DateTime<Utc>) -> bool {
        self.validity_start <= t0 && self.validity_stop >= t1
    }

    /// Calendar date of the validity start, used for day-granularity
    /// deduplication
    pub fn validity_start_date(&self) -> NaiveDate {
        self.validity_start.date_naive()
    }
}

// Equality intentionally excludes creation_time, source_id and filename:
// re-publication of the same window is common and must compare as "same
// coverage, possibly newer copy".
impl PartialEq for OrbitCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.mission == other.mission
            && self.tier == other.tier
            && self.validity_start == other.validity_start
            && self.validity_stop == other.validity_stop
    }
}

impl Eq for OrbitCandidate {}

impl Hash for OrbitCandidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mission.hash(state);
        self.tier.hash(state);
        self.validity_start.hash(state);
        self.validity_stop.hash(state);
    }
}

impl fmt::Display for OrbitCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{} .. {}]",
            self.mission, self.tier, self.validity_start, self.validity_stop
        )
    }
}

/// A coverage query handed to a source adapter: the target interval plus
/// the tier to search and the widened window to search within.
///
/// The search window is a retrieval heuristic (when the product was likely
/// published); the exact containment test against `[t0, t1]` happens after
/// retrieval. Invariant: `t0 <= t1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRequest {
    pub mission: Mission,
    pub tier: OrbitTier,
    pub t0: DateTime<Utc>,
    pub t1: DateTime<Utc>,
    /// Half-width of the search window around `t0`
    pub search_margin: chrono::Duration,
}

impl CoverageRequest {
    /// Widened interval handed to the source adapter
    pub fn search_window(&self) -> SearchWindow {
        SearchWindow {
            begin: self.t0 - self.search_margin,
            end: self.t1 + self.search_margin,
        }
    }
}

/// Time interval a source adapter searches within
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SearchWindow {
    /// Midpoint of the window, used by creation-date based listings
    pub fn midpoint(&self) -> DateTime<Utc> {
        self.begin + (self.end - self.begin) / 2
    }
}

/// Mission and acquisition start time extracted from a Sentinel-1 product
/// name, e.g. `S1A_IW_SLC__1SDV_20180420T043026_20180420T043054_...SAFE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId {
    pub mission: Mission,
    pub start_time: DateTime<Utc>,
}

impl SceneId {
    /// Parse a Sentinel-1 product name (or path to one)
    ///
    /// # Errors
    ///
    /// Returns `ParseError` when the name carries no recognizable mission
    /// code or acquisition timestamp.
    pub fn parse(name: &str) -> ParseResult<Self> {
        let base = name
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(name);

        let mut fields = base.split('_');
        let mission = Mission::from_str(fields.next().unwrap_or_default())?;

        // The acquisition start is the first timestamp-shaped field;
        // product type tokens before it vary (IW_SLC__1SDV, IW_GRDH_1SDV, ...)
        let start_time = fields
            .filter_map(|field| NaiveDateTime::parse_from_str(field, EOF_TIMESTAMP_FMT).ok())
            .map(|naive| naive.and_utc())
            .next()
            .ok_or_else(|| ParseError::MalformedIdentifier {
                identifier: base.to_string(),
            })?;

        Ok(SceneId {
            mission,
            start_time,
        })
    }
}

fn parse_timestamp(field: &str, label: &str, identifier: &str) -> ParseResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(field, EOF_TIMESTAMP_FMT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ParseError::InvalidTimestamp {
            field: label.to_string(),
            identifier: identifier.to_string(),
        })
}
