//! Main sync command

use crate::cancel::Cancellation;
use crate::config::SyncOptions;
use crate::diff::{generate_transfer_plan, PlanStats, TransferPlan};
use crate::executor::{execute_plan, Downloader, ExecutionEvent, ExecutionStats, Uploader};
use crate::remote::{RemoteEntry, RemoteStorage};
use crate::scanner::{scan_local, PathFilter};
use crate::types::{BunError, Direction, FileRecord};
use crate::ui::ProgressReporter;
use console::style;
use indicatif::HumanBytes;
use std::io::Write;

/// How a sync run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Every planned file was attempted, or nothing needed to move
    Done(ExecutionStats),

    /// Dry run: the plan was printed and nothing was transferred
    Planned(PlanStats),

    /// Stopped early on request; completed files stay in place
    Cancelled(ExecutionStats),
}

/// Run the sync operation, drawing transfer progress on stdout
pub async fn run(
    options: &SyncOptions,
    remote: &dyn RemoteStorage,
    cancel: &Cancellation,
) -> Result<SyncOutcome, BunError> {
    run_with_progress(options, remote, cancel, ProgressReporter::new(std::io::stdout())).await
}

/// Run the sync operation with an explicit progress sink
///
/// Validates the direction, fetches the remote inventory, walks the local
/// root, drops remote files the local exclude rules cover, compares the two
/// and executes the resulting plan. Cancellation is
/// honoured before every step. Invalid directions and listing failures are
/// returned as errors before any transfer starts; per-file failures are
/// reported and counted in the returned stats.
pub async fn run_with_progress<W: Write + Send>(
    options: &SyncOptions,
    remote: &dyn RemoteStorage,
    cancel: &Cancellation,
    mut progress: ProgressReporter<W>,
) -> Result<SyncOutcome, BunError> {
    if cancel.is_requested() {
        return Ok(cancelled_before_transfer());
    }

    let direction: Direction = options.direction.parse()?;

    let remote_files = fetch_remote_inventory(remote).await?;
    if cancel.is_requested() {
        return Ok(cancelled_before_transfer());
    }

    let (local_files, filter) = walk_local_inventory(options).await?;
    if cancel.is_requested() {
        return Ok(cancelled_before_transfer());
    }
    let remote_files = filter.retain(remote_files);

    let plan = match direction {
        Direction::Up => generate_transfer_plan(&local_files, &remote_files),
        Direction::Down => generate_transfer_plan(&remote_files, &local_files),
        Direction::None => {
            return Err(BunError::Config("Sync direction not set".to_string()));
        }
    };
    println!("{}", format_plan_preview(&plan, direction));

    if options.dry_run {
        println!("{}", format_dry_run_actions(&plan, direction));
        println!("Dry-run mode: no changes were made.");
        return Ok(SyncOutcome::Planned(plan.stats));
    }

    let stats = match direction {
        Direction::Up => {
            let mut uploader = Uploader::new(remote, &options.root, &mut progress, cancel);
            execute_plan(&plan.files, &mut uploader, cancel, Some(&print_event)).await
        }
        _ => {
            let mut downloader = Downloader::new(remote, &options.root, &mut progress, cancel);
            execute_plan(&plan.files, &mut downloader, cancel, Some(&print_event)).await
        }
    };

    if stats.cancelled {
        println!("Sync cancelled after {} of {} file(s).", stats.completed, stats.total);
        Ok(SyncOutcome::Cancelled(stats))
    } else {
        Ok(SyncOutcome::Done(stats))
    }
}

fn cancelled_before_transfer() -> SyncOutcome {
    SyncOutcome::Cancelled(ExecutionStats {
        cancelled: true,
        ..Default::default()
    })
}

async fn fetch_remote_inventory(remote: &dyn RemoteStorage) -> Result<Vec<FileRecord>, BunError> {
    let listing = remote.list_files().await?;
    if !listing.is_success() {
        return Err(BunError::InventoryFetch {
            status: listing.status,
        });
    }

    let files: Vec<FileRecord> = listing
        .entries
        .iter()
        .filter_map(RemoteEntry::to_record)
        .collect();
    tracing::info!(
        entries = listing.entries.len(),
        files = files.len(),
        "remote inventory fetched"
    );
    Ok(files)
}

async fn walk_local_inventory(
    options: &SyncOptions,
) -> Result<(Vec<FileRecord>, PathFilter), BunError> {
    let root = options.root.clone();
    let exclude = options.exclude.clone();
    let (files, filter) = tokio::task::spawn_blocking(move || -> Result<_, BunError> {
        let files = scan_local(&root, &exclude)?;
        let mut filter = PathFilter::new(&root, &exclude)?;
        filter.load_ignore_files(&files);
        Ok((files, filter))
    })
    .await
    .map_err(|e| BunError::Io(std::io::Error::other(e)))??;
    tracing::info!(files = files.len(), "local inventory walked");
    Ok((files, filter))
}

fn print_event(event: &ExecutionEvent<'_>) {
    match event {
        ExecutionEvent::Empty => println!("Nothing to sync."),
        ExecutionEvent::Start { index, total, path } => println!("[{}/{}] {}", index, total, path),
        ExecutionEvent::Success { .. } => {}
        ExecutionEvent::Error { path, error, .. } => {
            eprintln!("{} {}: {}", style("Failed").red(), path, error)
        }
        ExecutionEvent::Complete { stats } => println!("{}", style(format_summary(stats)).bold()),
    }
}

fn format_plan_preview(plan: &TransferPlan, direction: Direction) -> String {
    format!("Plan ({}):\n  {}", direction, plan.stats.summary())
}

fn format_dry_run_actions(plan: &TransferPlan, direction: Direction) -> String {
    if plan.is_empty() {
        return "Dry-run actions:\n  (no planned transfers)".to_string();
    }

    let verb = match direction {
        Direction::Up => "UPLOAD",
        _ => "DOWNLOAD",
    };
    let mut lines = Vec::with_capacity(plan.len() + 1);
    lines.push("Dry-run actions:".to_string());
    for record in &plan.files {
        lines.push(format!("  {:<10}{} ({})", verb, record.path, HumanBytes(record.size)));
    }
    lines.join("\n")
}

fn format_summary(stats: &ExecutionStats) -> String {
    format!(
        "Transferred {} of {} file(s), {} failed, {} total",
        stats.completed,
        stats.total,
        stats.failed,
        HumanBytes(stats.bytes_transferred)
    )
}
