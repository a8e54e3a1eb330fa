//! Saving selected orbit products to disk
//!
//! Writes are idempotent: the same filename always carries the same
//! content, so an existing file is simply skipped (no locking, no
//! partial-file bookkeeping) unless the caller forces a re-download.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::app::models::OrbitCandidate;
use crate::errors::{DownloadError, DownloadResult};

/// Fetch a selected candidate's bytes and write them under `save_dir`.
///
/// Returns the path of the saved (or already present) file.
///
/// # Errors
///
/// Returns `DownloadError` when the candidate has no fetchable URL, the
/// server answers with an error status, or the file cannot be written.
pub async fn save_candidate(
    client: &Client,
    candidate: &OrbitCandidate,
    save_dir: &Path,
    force: bool,
) -> DownloadResult<PathBuf> {
    let target = save_dir.join(candidate.filename());

    if target.exists() && !force {
        tracing::info!("{} already exists, skipping download", target.display());
        return Ok(target);
    }

    if !candidate.source_id.starts_with("http") {
        return Err(DownloadError::NotDownloadable {
            source_id: candidate.source_id.clone(),
        });
    }

    tracing::info!("downloading {}", candidate.source_id);
    let response = client.get(&candidate.source_id).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::ServerError {
            status: status.as_u16(),
            url: candidate.source_id.clone(),
        });
    }
    let bytes = response.bytes().await?;

    tokio::fs::create_dir_all(save_dir)
        .await
        .map_err(|source| DownloadError::Io {
            path: save_dir.to_path_buf(),
            source,
        })?;

    let mut file = tokio::fs::File::create(&target)
        .await
        .map_err(|source| DownloadError::Io {
            path: target.clone(),
            source,
        })?;
    file.write_all(&bytes)
        .await
        .map_err(|source| DownloadError::Io {
            path: target.clone(),
            source,
        })?;

    tracing::info!("saved {}", target.display());
    Ok(target)
}
