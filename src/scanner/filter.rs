//! Exclude rules shared by the local walk and the remote inventory

use super::IGNORE_FILENAME;
use crate::types::{BunError, FileRecord};
use ignore::gitignore::Gitignore;
use ignore::overrides::{Override, OverrideBuilder};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};

/// Decides which relative paths a sync leaves alone
///
/// Combines the `--exclude` globs with the rules of every ignore file found
/// in the local tree, so that both sides of a sync see the same set of
/// files. A path is excluded when it, or any directory above it, matches.
#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    overrides: Override,
    /// Deepest first, so nested files take precedence
    ignore_files: Vec<Gitignore>,
}

impl PathFilter {
    /// Build a filter for `root` from exclude globs alone
    ///
    /// # Errors
    /// * Invalid exclude patterns return `BunError::Config`
    pub fn new(root: &Path, exclude: &[String]) -> Result<Self, BunError> {
        Ok(Self {
            root: root.to_path_buf(),
            overrides: exclude_overrides(root, exclude)?,
            ignore_files: Vec::new(),
        })
    }

    /// Add the rules of every ignore file among `records`
    ///
    /// `records` come from a walk of the same root, so only ignore files the
    /// walk itself honoured are picked up.
    pub fn load_ignore_files(&mut self, records: &[FileRecord]) {
        for record in records {
            if record.path.rsplit('/').next() != Some(IGNORE_FILENAME) {
                continue;
            }
            let path = record.local_path(&self.root);
            let (matcher, err) = Gitignore::new(&path);
            if let Some(e) = err {
                tracing::warn!("partially read {}: {}", path.display(), e);
            }
            self.ignore_files.push(matcher);
        }
        self.ignore_files
            .sort_by_key(|m| Reverse(m.path().components().count()));
    }

    /// Whether the `/`-separated relative `path` is excluded
    pub fn is_excluded(&self, path: &str) -> bool {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut current = self.root.clone();
        for (i, segment) in segments.iter().enumerate() {
            current.push(segment);
            let is_dir = i + 1 < segments.len();
            if self.matches(&current, is_dir) {
                return true;
            }
        }
        false
    }

    /// Drop every excluded record
    pub fn retain(&self, records: Vec<FileRecord>) -> Vec<FileRecord> {
        records
            .into_iter()
            .filter(|record| {
                let excluded = self.is_excluded(&record.path);
                if excluded {
                    tracing::debug!(path = %record.path, "excluded");
                }
                !excluded
            })
            .collect()
    }

    fn matches(&self, path: &Path, is_dir: bool) -> bool {
        if self.overrides.matched(path, is_dir).is_ignore() {
            return true;
        }
        self.ignore_files
            .iter()
            .filter(|m| path.starts_with(m.path()))
            .map(|m| m.matched(path, is_dir))
            .find(|m| !m.is_none())
            .is_some_and(|m| m.is_ignore())
    }
}

/// Exclude globs as an ignore-crate override set rooted at `root`
pub(crate) fn exclude_overrides(root: &Path, exclude: &[String]) -> Result<Override, BunError> {
    let mut override_builder = OverrideBuilder::new(root);
    for pattern in exclude {
        // The ignore crate's OverrideBuilder uses ! for exclusion
        override_builder.add(&format!("!{}", pattern)).map_err(|e| {
            BunError::Config(format!("Invalid exclude pattern '{}': {}", pattern, e))
        })?;
    }
    override_builder
        .build()
        .map_err(|e| BunError::Config(format!("Failed to build exclude overrides: {}", e)))
}
