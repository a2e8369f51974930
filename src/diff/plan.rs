//! Transfer plan generation

use crate::diff::classify;
use crate::types::{FileRecord, SyncAction};
use indicatif::HumanBytes;
use std::collections::HashMap;

/// Compute the source records that must be copied onto the base side
///
/// Builds a path-keyed lookup over `base`, then keeps every source record
/// that is missing from it or whose base copy is stale. The result follows
/// the enumeration order of `source`. Neither input needs to be sorted.
///
/// # Example
/// ```
/// use buncli::diff::compare;
/// use buncli::types::FileRecord;
/// use chrono::{TimeZone, Utc};
///
/// let t = Utc.timestamp_opt(100, 0).unwrap();
/// let source = vec![FileRecord::new("a.txt", t, 10), FileRecord::new("b.txt", t, 5)];
/// let base = vec![FileRecord::new("a.txt", t, 10)];
///
/// let plan = compare(&source, &base);
/// assert_eq!(plan.len(), 1);
/// assert_eq!(plan[0].path, "b.txt");
/// ```
pub fn compare(source: &[FileRecord], base: &[FileRecord]) -> Vec<FileRecord> {
    let lookup = index_by_path(base);
    source
        .iter()
        .filter_map(|src| classify(src, lookup.get(src.path.as_str()).copied()).into_record())
        .collect()
}

fn index_by_path(records: &[FileRecord]) -> HashMap<&str, &FileRecord> {
    records
        .iter()
        .map(|record| (record.path.as_str(), record))
        .collect()
}

/// Ordered list of files one sync run must copy, with statistics
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransferPlan {
    /// Files to transfer, sorted by path
    pub files: Vec<FileRecord>,

    pub stats: PlanStats,
}

impl TransferPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the plan and update statistics
    pub fn add_action(&mut self, action: SyncAction) {
        match &action {
            SyncAction::CopyNew(record) => {
                self.stats.copy_count += 1;
                self.stats.total_bytes += record.size;
            }
            SyncAction::Overwrite(record) => {
                self.stats.overwrite_count += 1;
                self.stats.total_bytes += record.size;
            }
            SyncAction::Skip => {
                self.stats.skip_count += 1;
            }
        }

        if let Some(record) = action.into_record() {
            self.stats.total_files += 1;
            self.files.push(record);
        }
    }

    /// Sort files by path for deterministic output
    pub fn sort_by_path(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// Statistics about a transfer plan
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanStats {
    /// Files to transfer (CopyNew + Overwrite)
    pub total_files: usize,

    /// Bytes to transfer (CopyNew + Overwrite)
    pub total_bytes: u64,

    pub copy_count: usize,
    pub overwrite_count: usize,
    pub skip_count: usize,
}

impl PlanStats {
    /// One-line summary for the console
    pub fn summary(&self) -> String {
        format!(
            "New: {}  Changed: {}  Up to date: {}  Total to transfer: {}",
            self.copy_count,
            self.overwrite_count,
            self.skip_count,
            HumanBytes(self.total_bytes)
        )
    }
}

/// Build a sorted transfer plan from a source and a base inventory
///
/// Same selection as [`compare`], with per-action statistics, sorted by path.
pub fn generate_transfer_plan(source: &[FileRecord], base: &[FileRecord]) -> TransferPlan {
    let lookup = index_by_path(base);
    let mut plan = TransferPlan::new();

    for src in source {
        plan.add_action(classify(src, lookup.get(src.path.as_str()).copied()));
    }

    plan.sort_by_path();
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(path: &str, mtime: i64, size: u64) -> FileRecord {
        FileRecord::new(path, Utc.timestamp_opt(mtime, 0).unwrap(), size)
    }

    #[test]
    fn test_compare_keeps_source_order() {
        let source = vec![record("z.txt", 1, 1), record("a.txt", 1, 1), record("m.txt", 1, 1)];
        let result = compare(&source, &[]);

        let paths: Vec<_> = result.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["z.txt", "a.txt", "m.txt"]);
    }

    #[test]
    fn test_generate_plan_sorts_by_path() {
        let source = vec![record("z.txt", 1, 1), record("a.txt", 1, 1), record("m.txt", 1, 1)];
        let plan = generate_transfer_plan(&source, &[]);

        let paths: Vec<_> = plan.files.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "m.txt", "z.txt"]);
    }

    #[test]
    fn test_plan_stats() {
        let source = vec![
            record("new.txt", 100, 1000),
            record("changed.txt", 200, 2000),
            record("same.txt", 100, 5),
        ];
        let base = vec![record("changed.txt", 100, 2000), record("same.txt", 100, 5)];

        let plan = generate_transfer_plan(&source, &base);

        assert_eq!(plan.stats.copy_count, 1);
        assert_eq!(plan.stats.overwrite_count, 1);
        assert_eq!(plan.stats.skip_count, 1);
        assert_eq!(plan.stats.total_files, 2);
        assert_eq!(plan.stats.total_bytes, 3000);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_summary_uses_human_readable_bytes() {
        let plan = generate_transfer_plan(&[record("big.bin", 1, 5 * 1024 * 1024)], &[]);
        let summary = plan.stats.summary();

        assert!(summary.contains("New: 1"));
        assert!(summary.contains("MiB"));
    }

    #[test]
    fn test_empty_plan() {
        let plan = TransferPlan::new();
        assert!(plan.is_empty());
        assert_eq!(plan.stats, PlanStats::default());
    }
}
