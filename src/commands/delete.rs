//! `remove` verb

use crate::remote::RemoteStorage;
use crate::types::BunError;

pub async fn run(remote: &dyn RemoteStorage, name: &str) -> Result<(), BunError> {
    let status = remote.delete_file(name).await?;
    if !status.is_success() {
        return Err(BunError::DeleteFailed { status });
    }

    eprintln!("Deleted {}", name);
    Ok(())
}
