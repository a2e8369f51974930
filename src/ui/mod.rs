//! Console output helpers

mod progress;

pub use progress::{fraction, render_line, ProgressReporter, REFRESH_INTERVAL};
