//! Executor module for transfer plans

pub mod transfer;

use crate::cancel::Cancellation;
use crate::types::{BunError, FileRecord};
use async_trait::async_trait;

pub use transfer::{download_to_path, part_path_for, Downloader, Uploader, PART_SUFFIX};

/// Execution progress statistics for a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Number of files in the input plan.
    pub total: usize,
    /// Number of files transferred successfully.
    pub completed: usize,
    /// Number of files whose transfer failed.
    pub failed: usize,
    /// Aggregate transferred bytes.
    pub bytes_transferred: u64,
    /// Execution stopped early because cancellation was requested.
    pub cancelled: bool,
}

/// Events emitted while executing a plan.
#[derive(Debug)]
pub enum ExecutionEvent<'a> {
    /// The plan was empty; nothing was attempted.
    Empty,
    /// A file transfer started.
    Start {
        index: usize,
        total: usize,
        path: &'a str,
    },
    /// A file transfer succeeded.
    Success {
        index: usize,
        total: usize,
        path: &'a str,
        bytes: u64,
    },
    /// A file transfer failed but the executor continued.
    Error {
        index: usize,
        total: usize,
        path: &'a str,
        error: &'a BunError,
    },
    /// Every file in the plan was attempted.
    Complete { stats: &'a ExecutionStats },
}

/// Optional callback used to receive execution events.
pub type ExecutionCallback = dyn Fn(&ExecutionEvent<'_>) + Send + Sync;

/// Moves one planned file between the local tree and the zone
#[async_trait]
pub trait FileTransfer: Send {
    /// Transfer a single file, returning the number of bytes moved
    async fn transfer(&mut self, record: &FileRecord) -> Result<u64, BunError>;
}

/// Execute a transfer plan
///
/// Transfers files one at a time in plan order. A failed file is logged and
/// reported, then execution continues with the next one. Cancellation is
/// checked before the first file and after every file; once observed, no
/// further file is started and no completion event is emitted. A transfer
/// that returns `BunError::Cancelled` stops execution the same way.
pub async fn execute_plan<T: FileTransfer + ?Sized>(
    plan: &[FileRecord],
    transfer: &mut T,
    cancel: &Cancellation,
    on_event: Option<&ExecutionCallback>,
) -> ExecutionStats {
    let mut stats = ExecutionStats {
        total: plan.len(),
        ..Default::default()
    };

    if plan.is_empty() {
        emit_event(on_event, ExecutionEvent::Empty);
        return stats;
    }

    if cancel.is_requested() {
        stats.cancelled = true;
        return stats;
    }

    for (idx, record) in plan.iter().enumerate() {
        let index = idx + 1;
        emit_event(
            on_event,
            ExecutionEvent::Start {
                index,
                total: stats.total,
                path: &record.path,
            },
        );

        match transfer.transfer(record).await {
            Ok(bytes) => {
                stats.completed += 1;
                stats.bytes_transferred += bytes;
                emit_event(
                    on_event,
                    ExecutionEvent::Success {
                        index,
                        total: stats.total,
                        path: &record.path,
                        bytes,
                    },
                );
            }
            Err(err) if err.is_cancellation() => {
                tracing::info!(path = %record.path, "transfer interrupted by cancellation");
                stats.cancelled = true;
                return stats;
            }
            Err(err) => {
                stats.failed += 1;
                tracing::warn!(path = %record.path, error = %err, "transfer failed");
                emit_event(
                    on_event,
                    ExecutionEvent::Error {
                        index,
                        total: stats.total,
                        path: &record.path,
                        error: &err,
                    },
                );
            }
        }

        if cancel.is_requested() {
            stats.cancelled = true;
            return stats;
        }
    }

    emit_event(on_event, ExecutionEvent::Complete { stats: &stats });
    stats
}

fn emit_event(on_event: Option<&ExecutionCallback>, event: ExecutionEvent<'_>) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
