//! Throttled per-file transfer progress

use indicatif::{HumanBytes, HumanDuration};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Minimum time between two redraws of the progress line
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(333);

const BAR_WIDTH: usize = 20;
const LINE_WIDTH: usize = 96;

/// Renders byte-progress callbacks as a single, redrawn status line
///
/// State (the stopwatch and the last byte count) lives for the whole sync
/// run, not per file. One reporter serves one transfer at a time.
pub struct ProgressReporter<W: Write> {
    out: W,
    refresh_interval: Duration,
    /// Time of the last render, `None` while stopped
    clock: Option<Instant>,
    last_transferred: u64,
    /// A partial line is on screen without its trailing newline
    line_open: bool,
}

impl<W: Write> ProgressReporter<W> {
    /// Create a new progress reporter writing to `out`
    pub fn new(out: W) -> Self {
        Self::with_refresh_interval(out, REFRESH_INTERVAL)
    }

    pub fn with_refresh_interval(out: W, refresh_interval: Duration) -> Self {
        Self {
            out,
            refresh_interval,
            clock: None,
            last_transferred: 0,
            line_open: false,
        }
    }

    /// Report progress for the current file
    pub fn report(&mut self, transferred: u64, expected: u64, fraction: f64) -> io::Result<()> {
        self.report_at(Instant::now(), transferred, expected, fraction)
            .map(|_| ())
    }

    /// Report progress observed at `now`; returns whether a line was drawn
    ///
    /// The first call after a stop only starts the stopwatch, unless the
    /// transfer is already complete. Later calls draw when the refresh
    /// interval has passed or the transfer is complete.
    pub fn report_at(
        &mut self,
        now: Instant,
        transferred: u64,
        expected: u64,
        fraction: f64,
    ) -> io::Result<bool> {
        let complete = fraction >= 1.0;
        let since = match self.clock {
            Some(since) => since,
            // A file finishing in its first callback still gets its 100% line
            None if complete => now,
            None => {
                self.clock = Some(now);
                return Ok(false);
            }
        };

        let elapsed = now.saturating_duration_since(since);
        if elapsed < self.refresh_interval && !complete {
            return Ok(false);
        }

        let window_ms = elapsed.max(self.refresh_interval).as_millis().max(1) as f64;
        let delta = transferred.saturating_sub(self.last_transferred);
        let rate = (delta as f64 / window_ms * 1000.0) as u64;

        self.last_transferred = transferred;
        self.clock = Some(now);

        let line = render_line(fraction, transferred, expected, rate);
        write!(self.out, "\r{:<width$}", line, width = LINE_WIDTH)?;

        if complete {
            writeln!(self.out)?;
            self.last_transferred = 0;
            self.clock = None;
        }
        self.line_open = !complete;
        self.out.flush()?;
        Ok(true)
    }

    /// Stop tracking a transfer that ended before completion
    ///
    /// Terminates a partially drawn line so later output starts on a fresh
    /// line, and resets the stopwatch for the next file.
    pub fn abandon(&mut self) -> io::Result<()> {
        self.last_transferred = 0;
        self.clock = None;
        if self.line_open {
            self.line_open = false;
            writeln!(self.out)?;
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Completion ratio in `[0, 1]`; an empty transfer counts as complete
pub fn fraction(transferred: u64, expected: u64) -> f64 {
    if expected == 0 {
        1.0
    } else {
        (transferred as f64 / expected as f64).min(1.0)
    }
}

/// Format one progress line (without the carriage return or padding)
pub fn render_line(fraction: f64, transferred: u64, expected: u64, rate: u64) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = ((fraction * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
    let mut line = format!(
        "{:>4} [{:<bar$}] {} / {} {}/s",
        format!("{}%", (fraction * 100.0) as u32),
        "#".repeat(filled),
        HumanBytes(transferred),
        HumanBytes(expected),
        HumanBytes(rate),
        bar = BAR_WIDTH
    );

    if fraction < 1.0 && rate > 0 && expected > transferred {
        let remaining = Duration::from_secs((expected - transferred) / rate);
        line.push_str(&format!(" ETA {}", HumanDuration(remaining)));
    }
    line
}
