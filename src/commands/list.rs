//! `list` verb

use crate::remote::{RemoteEntry, RemoteStorage};
use crate::types::BunError;
use indicatif::HumanBytes;

const COLUMN_WIDTH: usize = 14;

pub async fn run(remote: &dyn RemoteStorage) -> Result<(), BunError> {
    let listing = remote.list_files().await?;
    if !listing.is_success() {
        return Err(BunError::InventoryFetch {
            status: listing.status,
        });
    }

    print!("{}", format_listing(&listing.entries));
    Ok(())
}

/// Render a listing table: files first, then directories, each by name
pub fn format_listing(entries: &[RemoteEntry]) -> String {
    let mut sorted: Vec<&RemoteEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        a.is_directory
            .cmp(&b.is_directory)
            .then_with(|| a.object_name.cmp(&b.object_name))
    });

    let mut out = format!(
        "{:<w$}{:<w$}{:<w$}{}\n",
        "Created",
        "Size",
        "IsDir",
        "Name",
        w = COLUMN_WIDTH
    );
    for entry in sorted {
        out.push_str(&format!(
            "{:<w$}{:<w$}{:<w$}{}\n",
            entry.date_created.format("%Y-%m-%d").to_string(),
            HumanBytes(entry.length).to_string(),
            entry.is_directory,
            entry.relative_path(),
            w = COLUMN_WIDTH
        ));
    }
    out
}
