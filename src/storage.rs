// src/storage.rs
//! JSON persistence for analyzed batches. Files land under a data directory
//! with timestamped names so successive runs never clobber each other.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::listing::AnalyzedListing;

pub const DEFAULT_DATA_DIR: &str = "data";

pub const ENV_DATA_DIR: &str = "ANALYZER_DATA_DIR";

/// Directory batch saves land in: `$ANALYZER_DATA_DIR` or `data`.
pub fn resolve_data_dir() -> PathBuf {
    std::env::var(ENV_DATA_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Save a batch under `dir`, naming the file `listings_YYYYmmdd_HHMMSS.json`.
/// Returns the path written.
pub fn save_batch(dir: impl AsRef<Path>, batch: &[AnalyzedListing]) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.as_ref().join(format!("listings_{timestamp}.json"));
    save_batch_to(&path, batch)?;
    Ok(path)
}

/// Save a batch to an explicit path, creating parent directories as needed.
pub fn save_batch_to(path: impl AsRef<Path>, batch: &[AnalyzedListing]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(batch).context("serializing batch")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(count = batch.len(), path = %path.display(), "saved analyzed batch");
    Ok(())
}

/// Load a previously saved batch.
pub fn load_batch(path: impl AsRef<Path>) -> Result<Vec<AnalyzedListing>> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let batch: Vec<AnalyzedListing> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    info!(count = batch.len(), path = %path.display(), "loaded analyzed batch");
    Ok(batch)
}

/// Saved batch files under `dir`, newest first by modification time. Missing
/// directory yields an empty list rather than an error.
pub fn list_saved_batches(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension().map(|e| e == "json").unwrap_or(false)
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("listings_"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort_by_key(|p| {
        fs::metadata(p)
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
    });
    files.reverse();
    Ok(files)
}
