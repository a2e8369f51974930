//! SyncAction - Per-file decisions made by the comparator

use super::FileRecord;

/// What the comparator decided for one source record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Missing on the base side
    CopyNew(FileRecord),

    /// Present on the base side but different size or older
    Overwrite(FileRecord),

    /// Base copy is up to date
    Skip,
}

impl SyncAction {
    /// The record to transfer, if any
    pub fn into_record(self) -> Option<FileRecord> {
        match self {
            SyncAction::CopyNew(record) | SyncAction::Overwrite(record) => Some(record),
            SyncAction::Skip => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, SyncAction::Skip)
    }

    pub fn is_overwrite(&self) -> bool {
        matches!(self, SyncAction::Overwrite(_))
    }
}
