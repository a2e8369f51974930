//! Set comparison integration tests
//!
//! Properties of `compare` and the example scenarios for plan generation.

use buncli::diff::{compare, generate_transfer_plan};
use buncli::types::FileRecord;
use chrono::{TimeZone, Utc};

// ═══════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════

fn rec(path: &str, mtime_secs: i64, size: u64) -> FileRecord {
    FileRecord::new(path, Utc.timestamp_opt(mtime_secs, 0).unwrap(), size)
}

fn paths(records: &[FileRecord]) -> Vec<&str> {
    records.iter().map(|r| r.path.as_str()).collect()
}

// ═══════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════

#[test]
fn test_disjoint_sets_return_whole_source() {
    let source = vec![rec("a.txt", 1, 1), rec("dir/b.txt", 2, 2), rec("c.txt", 3, 3)];
    let base = vec![rec("x.txt", 1, 1), rec("dir/y.txt", 2, 2)];

    assert_eq!(compare(&source, &base), source);
}

#[test]
fn test_empty_inputs() {
    let some = vec![rec("a.txt", 1, 1), rec("b.txt", 1, 1)];

    assert!(compare(&[], &some).is_empty());
    assert!(compare(&[], &[]).is_empty());
    assert_eq!(compare(&some, &[]), some);
}

#[test]
fn test_equal_size_and_base_not_older_is_excluded() {
    for (source_mtime, base_mtime) in [(100, 100), (100, 101), (0, 9_999_999)] {
        let source = vec![rec("a.txt", source_mtime, 10)];
        let base = vec![rec("a.txt", base_mtime, 10)];
        assert!(
            compare(&source, &base).is_empty(),
            "source t={} base t={}",
            source_mtime,
            base_mtime
        );
    }
}

#[test]
fn test_size_mismatch_or_older_base_is_included() {
    let cases = [
        // (source mtime, source size, base mtime, base size)
        (100, 10, 100, 11),
        (100, 10, 200, 9),
        (200, 10, 100, 10),
        (200, 10, 100, 0),
    ];
    for (s_t, s_size, b_t, b_size) in cases {
        let source = vec![rec("a.txt", s_t, s_size)];
        let base = vec![rec("a.txt", b_t, b_size)];
        assert_eq!(compare(&source, &base), source);
    }
}

#[test]
fn test_inputs_need_not_be_sorted() {
    let source = vec![rec("z.txt", 1, 1), rec("a.txt", 1, 1), rec("m.txt", 1, 1)];
    let base = vec![rec("m.txt", 1, 1)];

    assert_eq!(paths(&compare(&source, &base)), vec!["z.txt", "a.txt"]);
}

#[test]
fn test_paths_are_case_sensitive_keys() {
    let source = vec![rec("Readme.md", 1, 1)];
    let base = vec![rec("readme.md", 1, 1)];

    assert_eq!(compare(&source, &base).len(), 1);
}

// ═══════════════════════════════════════════════════════════
// Scenarios
// ═══════════════════════════════════════════════════════════

#[test]
fn test_scenario_identical_file_is_skipped() {
    let plan = generate_transfer_plan(&[rec("a.txt", 100, 10)], &[rec("a.txt", 100, 10)]);

    assert!(plan.is_empty());
    assert_eq!(plan.stats.skip_count, 1);
}

#[test]
fn test_scenario_newer_source_is_transferred() {
    let plan = generate_transfer_plan(&[rec("a.txt", 200, 10)], &[rec("a.txt", 100, 10)]);

    assert_eq!(paths(&plan.files), vec!["a.txt"]);
    assert_eq!(plan.stats.overwrite_count, 1);
    assert_eq!(plan.stats.total_bytes, 10);
}

#[test]
fn test_scenario_only_missing_file_is_transferred() {
    let source = vec![rec("a.txt", 100, 10), rec("b.txt", 100, 5)];
    let base = vec![rec("a.txt", 100, 10)];

    let plan = generate_transfer_plan(&source, &base);

    assert_eq!(paths(&plan.files), vec!["b.txt"]);
    assert_eq!(plan.stats.copy_count, 1);
    assert_eq!(plan.stats.skip_count, 1);
}

#[test]
fn test_plan_is_sorted_by_path() {
    let source = vec![rec("b/z.txt", 1, 1), rec("a.txt", 1, 1), rec("b/a.txt", 1, 1)];

    let plan = generate_transfer_plan(&source, &[]);

    assert_eq!(paths(&plan.files), vec!["a.txt", "b/a.txt", "b/z.txt"]);
}
