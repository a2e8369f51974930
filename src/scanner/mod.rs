//! Local directory scanning

mod filter;
mod walker;

pub use filter::PathFilter;
pub use walker::{scan_local, walk_local, IGNORE_FILENAME};
