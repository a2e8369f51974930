//! Per-file upload and download between the local tree and a zone

use super::FileTransfer;
use crate::cancel::Cancellation;
use crate::remote::{ProgressFn, RemoteStorage};
use crate::types::{BunError, FileRecord};
use crate::ui::{fraction, ProgressReporter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Suffix of a download that has not completed yet
pub const PART_SUFFIX: &str = ".bunpart";

/// Uploads local files under `root` to the zone path of each record
pub struct Uploader<'a, W: Write + Send> {
    remote: &'a dyn RemoteStorage,
    root: &'a Path,
    progress: &'a mut ProgressReporter<W>,
    cancel: &'a Cancellation,
}

impl<'a, W: Write + Send> Uploader<'a, W> {
    pub fn new(
        remote: &'a dyn RemoteStorage,
        root: &'a Path,
        progress: &'a mut ProgressReporter<W>,
        cancel: &'a Cancellation,
    ) -> Self {
        Self {
            remote,
            root,
            progress,
            cancel,
        }
    }
}

#[async_trait]
impl<'a, W: Write + Send> FileTransfer for Uploader<'a, W> {
    async fn transfer(&mut self, record: &FileRecord) -> Result<u64, BunError> {
        let result = self.upload(record).await;
        if result.is_err() {
            abandon(self.progress);
        }
        result
    }
}

impl<W: Write + Send> Uploader<'_, W> {
    async fn upload(&mut self, record: &FileRecord) -> Result<u64, BunError> {
        let remote = self.remote;
        let cancel = self.cancel;
        let source = record.local_path(self.root);

        let file = tokio::fs::File::open(&source).await?;
        let length = file.metadata().await?.len();

        let progress = &mut *self.progress;
        let mut on_progress = |sent: u64, expected: u64| report(progress, sent, expected);

        let upload = remote.put_file(&record.path, Box::new(file), Some(length), &mut on_progress);
        let status = tokio::select! {
            status = upload => status?,
            _ = cancel.cancelled() => return Err(BunError::Cancelled),
        };

        if !status.is_success() {
            return Err(BunError::Status {
                operation: "upload",
                status,
            });
        }
        Ok(length)
    }
}

/// Downloads zone objects into the local tree under `root`
///
/// Files land under their final name only once complete; the local
/// modification time is set to the zone's last-changed time so a repeated
/// sync finds nothing to do.
pub struct Downloader<'a, W: Write + Send> {
    remote: &'a dyn RemoteStorage,
    root: &'a Path,
    progress: &'a mut ProgressReporter<W>,
    cancel: &'a Cancellation,
}

impl<'a, W: Write + Send> Downloader<'a, W> {
    pub fn new(
        remote: &'a dyn RemoteStorage,
        root: &'a Path,
        progress: &'a mut ProgressReporter<W>,
        cancel: &'a Cancellation,
    ) -> Self {
        Self {
            remote,
            root,
            progress,
            cancel,
        }
    }
}

#[async_trait]
impl<'a, W: Write + Send> FileTransfer for Downloader<'a, W> {
    async fn transfer(&mut self, record: &FileRecord) -> Result<u64, BunError> {
        let result = self.download(record).await;
        if result.is_err() {
            abandon(self.progress);
        }
        result
    }
}

impl<W: Write + Send> Downloader<'_, W> {
    async fn download(&mut self, record: &FileRecord) -> Result<u64, BunError> {
        let dest = record.local_path(self.root);
        let size_hint = record.size;

        let progress = &mut *self.progress;
        // Chunked responses carry no length; fall back to the listed size
        let mut on_progress = |received: u64, expected: u64| {
            let expected = if expected == 0 { size_hint } else { expected };
            report(progress, received, expected)
        };

        download_to_path(
            self.remote,
            &record.path,
            &dest,
            &mut on_progress,
            self.cancel,
            Some(record.last_modified),
        )
        .await
    }
}

/// Download `name` into `dest` through a part file
///
/// 1. Create missing parent directories
/// 2. Stream the object into `<dest>.bunpart`
/// 3. Optionally stamp the part file with `mtime`
/// 4. Rename over `dest`
///
/// On any failure, cancellation included, the part file is removed and
/// `dest` is left untouched.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes written
/// * `Err(BunError::Status)` - The zone answered with a non-success status
pub async fn download_to_path(
    remote: &dyn RemoteStorage,
    name: &str,
    dest: &Path,
    on_progress: &mut ProgressFn<'_>,
    cancel: &Cancellation,
    mtime: Option<DateTime<Utc>>,
) -> Result<u64, BunError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let part_path = part_path_for(dest);
    let result = write_part(remote, name, &part_path, dest, on_progress, cancel, mtime).await;

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&part_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("could not remove {}: {}", part_path.display(), e);
            }
        }
    }
    result
}

async fn write_part(
    remote: &dyn RemoteStorage,
    name: &str,
    part_path: &Path,
    dest: &Path,
    on_progress: &mut ProgressFn<'_>,
    cancel: &Cancellation,
    mtime: Option<DateTime<Utc>>,
) -> Result<u64, BunError> {
    let mut part_file = tokio::fs::File::create(part_path).await?;

    let status = remote.get_file(name, &mut part_file, on_progress, cancel).await?;
    if !status.is_success() {
        return Err(BunError::Status {
            operation: "download",
            status,
        });
    }

    part_file.flush().await?;
    part_file.sync_all().await?;
    let bytes = part_file.metadata().await?.len();

    // Close before rename (required on Windows)
    drop(part_file);

    if let Some(mtime) = mtime {
        let file_time = filetime::FileTime::from_unix_time(
            mtime.timestamp(),
            mtime.timestamp_subsec_nanos(),
        );
        filetime::set_file_mtime(part_path, file_time)?;
    }

    tokio::fs::rename(part_path, dest).await?;
    Ok(bytes)
}

/// `<dest>.bunpart`, next to the destination
pub fn part_path_for(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

fn report<W: Write>(progress: &mut ProgressReporter<W>, transferred: u64, expected: u64) {
    if let Err(e) = progress.report(transferred, expected, fraction(transferred, expected)) {
        tracing::debug!("progress output failed: {}", e);
    }
}

fn abandon<W: Write>(progress: &mut ProgressReporter<W>) {
    if let Err(e) = progress.abandon() {
        tracing::debug!("progress output failed: {}", e);
    }
}
