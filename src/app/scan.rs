//! Scene discovery for batch building
//!
//! Scans a directory of Sentinel-1 products and turns them into
//! resolution requests, skipping scenes whose observation time is already
//! covered by an EOF file sitting in the save directory.

use std::collections::HashSet;
use std::path::Path;

use crate::app::models::{OrbitCandidate, SceneId};
use crate::app::resolver::ResolutionRequest;
use crate::constants::files;
use crate::errors::Result;

/// Collect unique (mission, time) requests from the Sentinel-1 products
/// found directly under `search_path`.
///
/// Non-Sentinel entries are skipped with a debug diagnostic; duplicate
/// acquisitions collapse to one request.
pub fn scan_scenes(search_path: &Path) -> Result<Vec<ResolutionRequest>> {
    let mut seen: HashSet<SceneId> = HashSet::new();
    let mut requests = Vec::new();

    for entry in std::fs::read_dir(search_path)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(files::SENTINEL_PREFIX) {
            continue;
        }
        match SceneId::parse(&name) {
            Ok(scene) => {
                if seen.insert(scene) {
                    requests.push(ResolutionRequest::new(scene.mission, scene.start_time));
                }
            }
            Err(_) => {
                tracing::debug!("skipping {name}, not a Sentinel-1 product");
            }
        }
    }

    Ok(requests)
}

/// Parse the EOF files already present in `save_dir`
pub fn existing_orbits(save_dir: &Path) -> Vec<OrbitCandidate> {
    let Ok(entries) = std::fs::read_dir(save_dir) else {
        return Vec::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy().into_owned();
            if !name.ends_with(files::EOF_EXTENSION) {
                return None;
            }
            OrbitCandidate::parse(&name).ok()
        })
        .collect()
}

/// Drop requests whose observation time is already covered by an orbit
/// file on disk
pub fn without_covered(
    requests: Vec<ResolutionRequest>,
    existing: &[OrbitCandidate],
) -> Vec<ResolutionRequest> {
    requests
        .into_iter()
        .filter(|request| {
            let covered = existing
                .iter()
                .any(|orbit| orbit.mission == request.mission && orbit.covers(request.time, request.time));
            if covered {
                tracing::info!("skipping {request}, orbit file already on disk");
            }
            !covered
        })
        .collect()
}
