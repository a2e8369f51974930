//! FileRecord - One file on either side of a sync

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A leaf file in an inventory (remote listing or local walk)
///
/// `path` is the identity key: two records with the same path describe the
/// same logical file, whatever their size or timestamp. Paths are relative to
/// the sync root and always use `/` as the separator so that remote and local
/// records compare equal across platforms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    /// Relative path from the sync root, `/`-separated
    pub path: String,

    /// Last modification time (UTC)
    pub last_modified: DateTime<Utc>,

    /// File size in bytes
    pub size: u64,
}

impl FileRecord {
    /// Create a new FileRecord
    pub fn new(path: impl Into<String>, last_modified: DateTime<Utc>, size: u64) -> Self {
        Self {
            path: path.into(),
            last_modified,
            size,
        }
    }

    /// Build a record from a path relative to a local root
    ///
    /// Returns `None` when the path has a component that is not valid UTF-8,
    /// since such a file could never be addressed on the remote side.
    pub fn from_relative_path(
        relative: &Path,
        last_modified: DateTime<Utc>,
        size: u64,
    ) -> Option<Self> {
        let mut segments = Vec::new();
        for component in relative.components() {
            segments.push(component.as_os_str().to_str()?);
        }
        Some(Self::new(segments.join("/"), last_modified, size))
    }

    /// Whether the path stays beneath the sync root
    ///
    /// `.` and `..` segments are refused outright rather than normalised.
    pub fn is_contained(&self) -> bool {
        !self
            .path
            .split('/')
            .any(|segment| segment == "." || segment == "..")
    }

    /// Resolve this record's path beneath a local root
    pub fn local_path(&self, root: &Path) -> PathBuf {
        self.path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
    }
}
