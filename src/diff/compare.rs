//! File comparison logic

use crate::types::{FileRecord, SyncAction};

/// Decide whether a source record must be copied onto the base side
///
/// Metadata-only comparison:
///
/// 1. **Missing on base**: nothing to compare against → CopyNew
/// 2. **Size mismatch**: files are definitely different → Overwrite
/// 3. **Modification time**:
///    - Base older than source → Overwrite
///    - Base same age or newer → Skip
///
/// Equal size and equal mtime count as up to date even if the contents
/// differ. No content hashing is done.
pub fn classify(src: &FileRecord, base: Option<&FileRecord>) -> SyncAction {
    let Some(base) = base else {
        return SyncAction::CopyNew(src.clone());
    };

    if base.size == src.size && base.last_modified >= src.last_modified {
        SyncAction::Skip
    } else {
        SyncAction::Overwrite(src.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(path: &str, mtime: i64, size: u64) -> FileRecord {
        FileRecord::new(path, Utc.timestamp_opt(mtime, 0).unwrap(), size)
    }

    #[test]
    fn test_missing_base_is_copy_new() {
        let src = record("a.txt", 100, 10);
        assert_eq!(classify(&src, None), SyncAction::CopyNew(src.clone()));
    }

    #[test]
    fn test_identical_is_skip() {
        let src = record("a.txt", 100, 10);
        let base = record("a.txt", 100, 10);
        assert!(classify(&src, Some(&base)).is_skip());
    }

    #[test]
    fn test_base_newer_is_skip() {
        let src = record("a.txt", 100, 10);
        let base = record("a.txt", 500, 10);
        assert!(classify(&src, Some(&base)).is_skip());
    }

    #[test]
    fn test_source_newer_is_overwrite() {
        let src = record("a.txt", 200, 10);
        let base = record("a.txt", 100, 10);
        assert!(classify(&src, Some(&base)).is_overwrite());
    }

    #[test]
    fn test_size_mismatch_is_overwrite_even_if_base_newer() {
        let src = record("a.txt", 100, 10);
        let base = record("a.txt", 900, 11);
        assert!(classify(&src, Some(&base)).is_overwrite());
    }
}
