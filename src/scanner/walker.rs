//! Local directory walker

use super::filter::exclude_overrides;
use crate::executor::PART_SUFFIX;
use crate::types::{BunError, FileRecord};
use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::path::Path;
use std::time::Instant;

/// Name of the per-directory ignore file honoured by the walker
pub const IGNORE_FILENAME: &str = ".bunignore";

/// Lazily enumerate the files under `root`
///
/// Recurses into subdirectories and yields one [`FileRecord`] per regular
/// file, with a path relative to `root`. Directories, special files,
/// unfinished download part files and anything matching `exclude` are left
/// out. Entries that cannot be read are logged and skipped.
///
/// # Errors
/// * Invalid exclude patterns return `BunError::Config`
pub fn walk_local(
    root: &Path,
    exclude: &[String],
) -> Result<impl Iterator<Item = FileRecord>, BunError> {
    let overrides = exclude_overrides(root, exclude)?;

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .add_custom_ignore_filename(IGNORE_FILENAME)
        .overrides(overrides)
        .build();

    let root = root.to_path_buf();
    Ok(walker.filter_map(move |result| match result {
        Ok(entry) => record_for_entry(&root, &entry),
        Err(e) => {
            tracing::warn!("skipping unreadable entry: {}", e);
            None
        }
    }))
}

/// Walk `root` completely and return its inventory sorted by path
pub fn scan_local(root: &Path, exclude: &[String]) -> Result<Vec<FileRecord>, BunError> {
    let start_time = Instant::now();
    let mut records: Vec<FileRecord> = walk_local(root, exclude)?.collect();
    records.sort_by(|a, b| a.path.cmp(&b.path));

    tracing::debug!(
        root = %root.display(),
        files = records.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "local scan complete"
    );
    Ok(records)
}

fn record_for_entry(root: &Path, entry: &ignore::DirEntry) -> Option<FileRecord> {
    let file_type = entry.file_type()?;
    if file_type.is_dir() {
        return None;
    }

    if entry.file_name().to_string_lossy().ends_with(PART_SUFFIX) {
        return None;
    }

    // Symlinks count when they point at a regular file
    let metadata = if file_type.is_symlink() {
        std::fs::metadata(entry.path()).map_err(ignore::Error::from)
    } else {
        entry.metadata()
    };
    let metadata: Metadata = match metadata {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!("skipping {}: {}", entry.path().display(), e);
            return None;
        }
    };
    if !metadata.is_file() {
        return None;
    }

    let relative_path = match entry.path().strip_prefix(root) {
        Ok(p) => p,
        Err(_) => {
            tracing::warn!(
                "skipping {}: outside of the sync root",
                entry.path().display()
            );
            return None;
        }
    };

    let mtime = match metadata.modified() {
        Ok(t) => DateTime::<Utc>::from(t),
        Err(e) => {
            tracing::warn!(
                "skipping {}: no modification time: {}",
                entry.path().display(),
                e
            );
            return None;
        }
    };

    let record = FileRecord::from_relative_path(relative_path, mtime, metadata.len());
    if record.is_none() {
        tracing::warn!("skipping {}: path is not valid UTF-8", entry.path().display());
    }
    record
}
