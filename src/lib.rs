//! # buncli - Bunny storage zone client
//!
//! Lists, uploads, downloads and deletes files in a storage zone, and keeps a
//! local directory in sync with it in either direction.

// Module declarations
pub mod cancel;
pub mod commands;
pub mod config;
pub mod diff;
pub mod executor;
pub mod logging;
pub mod remote;
pub mod scanner;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use cancel::Cancellation;
pub use config::Config;
pub use types::{BunError, Direction, FileRecord, ReturnCode, SyncAction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
