//! Verb implementations

pub mod delete;
pub mod download;
pub mod list;
pub mod sync;
pub mod upload;

use crate::cancel::Cancellation;
use crate::config::{Command, Config};
use crate::remote::BunnyStorage;
use crate::types::BunError;

pub use sync::SyncOutcome;

/// Run the configured verb against the configured zone
pub async fn run(config: Config) -> Result<(), BunError> {
    let remote = BunnyStorage::new(&config.endpoint, &config.zone, &config.key)?;
    let cancel = Cancellation::new();
    cancel.install_signal_handlers();

    match &config.command {
        Command::List => list::run(&remote).await,
        Command::Upload { source, name } => upload::run(&remote, source, name, &cancel).await,
        Command::Get { name, direct } => download::run(&remote, name, *direct, &cancel).await,
        Command::Remove { name } => delete::run(&remote, name).await,
        Command::Sync(options) => sync::run(options, &remote, &cancel).await.map(|_| ()),
    }
}
