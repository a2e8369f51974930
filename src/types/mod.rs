//! Core type definitions for buncli

mod action;
mod direction;
mod entry;
mod error;

pub use action::SyncAction;
pub use direction::Direction;
pub use entry::FileRecord;
pub use error::{BunError, ReturnCode};
