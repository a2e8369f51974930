//! `get` verb

use crate::cancel::Cancellation;
use crate::executor::download_to_path;
use crate::remote::RemoteStorage;
use crate::types::BunError;
use indicatif::HumanBytes;
use std::path::{Path, PathBuf};

/// Download `name` to stdout, or into the current directory with `direct`
pub async fn run(
    remote: &dyn RemoteStorage,
    name: &str,
    direct: bool,
    cancel: &Cancellation,
) -> Result<(), BunError> {
    if direct {
        let dest = direct_destination(Path::new("."), name)?;
        let bytes = download_to_path(remote, name, &dest, &mut |_, _| {}, cancel, None).await?;
        eprintln!("Saved {} ({})", dest.display(), HumanBytes(bytes));
        return Ok(());
    }

    let mut stdout = tokio::io::stdout();
    let status = remote.get_file(name, &mut stdout, &mut |_, _| {}, cancel).await?;
    if !status.is_success() {
        return Err(BunError::Status {
            operation: "download",
            status,
        });
    }
    Ok(())
}

/// Local file for a direct download: the remote base name inside `dir`
pub fn direct_destination(dir: &Path, name: &str) -> Result<PathBuf, BunError> {
    name.rsplit('/')
        .find(|segment| !segment.is_empty())
        .filter(|segment| *segment != "." && *segment != "..")
        .map(|segment| dir.join(segment))
        .ok_or_else(|| BunError::Config(format!("'{}' does not name a file", name)))
}
