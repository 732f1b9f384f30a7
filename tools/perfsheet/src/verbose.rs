//! Output levels for batch progress and diagnostics.
//!
//! - **Quiet** (`-q`): errors and the closing summary only
//! - **Normal**: one line per report plus its normalized table
//! - **Verbose** (`-v`): also run counts, skipped lines, and per-report timings

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

/// How much the batch prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Level {
    /// Errors and summary.
    Quiet = 0,
    /// Progress and tables.
    Normal = 1,
    /// Everything.
    Verbose = 2,
}

impl Level {
    /// Level selected by the `-q`/`-v` flags. clap rejects both at once.
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, true) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(Level::Normal as u8);

/// Set the process-wide level. Called once from `main`.
pub fn init(level: Level) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

fn level() -> u8 {
    LEVEL.load(Ordering::Relaxed)
}

/// Returns `true` when `-v` was given.
pub fn is_verbose() -> bool {
    level() >= Level::Verbose as u8
}

/// Returns `true` when `-q` was given.
pub fn is_quiet() -> bool {
    level() == Level::Quiet as u8
}

/// `println!` that only fires in verbose mode.
macro_rules! vprintln {
    ($($arg:tt)*) => {
        if $crate::verbose::is_verbose() {
            println!($($arg)*);
        }
    };
}

pub(crate) use vprintln;

/// `println!` suppressed by `-q`.
macro_rules! dprintln {
    ($($arg:tt)*) => {
        if !$crate::verbose::is_quiet() {
            println!($($arg)*);
        }
    };
}

pub(crate) use dprintln;

/// Prints how long a report took when dropped, in verbose mode only.
pub struct Timer {
    what: String,
    start: Instant,
}

impl Timer {
    /// Start timing `what` (usually a report's file name).
    pub fn start(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        vprintln!("  {} done in {:.1?}", self.what, self.start.elapsed());
    }
}
