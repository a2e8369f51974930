//! `upload` verb

use crate::cancel::Cancellation;
use crate::config::UploadSource;
use crate::remote::RemoteStorage;
use crate::types::BunError;
use crate::ui::{fraction, ProgressReporter};
use std::io::IsTerminal;
use tokio::io::AsyncRead;

pub async fn run(
    remote: &dyn RemoteStorage,
    source: &UploadSource,
    name: &str,
    cancel: &Cancellation,
) -> Result<(), BunError> {
    let (reader, length): (Box<dyn AsyncRead + Unpin + Send + Sync>, Option<u64>) = match source {
        UploadSource::File(path) => {
            let file = tokio::fs::File::open(path).await?;
            let length = file.metadata().await?.len();
            (Box::new(file), Some(length))
        }
        UploadSource::Stdin => (Box::new(tokio::io::stdin()), None),
    };

    // Progress only makes sense for a known length on an interactive stderr
    let mut progress = (length.is_some() && std::io::stderr().is_terminal())
        .then(|| ProgressReporter::new(std::io::stderr()));
    let mut on_progress = |sent: u64, expected: u64| {
        if let Some(progress) = progress.as_mut() {
            let _ = progress.report(sent, expected, fraction(sent, expected));
        }
    };

    let status = tokio::select! {
        status = remote.put_file(name, reader, length, &mut on_progress) => status?,
        _ = cancel.cancelled() => return Err(BunError::Cancelled),
    };

    if !status.is_success() {
        return Err(BunError::Status {
            operation: "upload",
            status,
        });
    }

    eprintln!("File {} uploaded successfully.", name);
    Ok(())
}
