use std::cell::Cell;

use log::info;

pub use crate::traits::Progress;

/// Default number of events between two progress reports
pub const DEFAULT_INTERVAL: u64 = 1000;

/// Dummy progress indicator
#[derive(Debug, Default, Copy, Clone)]
pub struct NoProgress {}
impl Progress for NoProgress {
    fn inc(&self, _i: u64) {}

    fn finish(&self) {}
}

/// Don't show any progress indicator
pub const NO_PROGRESS: NoProgress = NoProgress {};

/// Progress indicator logging a line after a fixed number of events
#[derive(Debug)]
pub struct ProgressLog {
    interval: u64,
    count: Cell<u64>,
}

impl Default for ProgressLog {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl ProgressLog {
    /// Report progress every `interval` events
    ///
    /// An interval of zero disables the reports.
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            count: Cell::new(0),
        }
    }

    /// Number of events counted so far
    pub fn count(&self) -> u64 {
        self.count.get()
    }

    /// Whether going from `old` to `new` events crosses a multiple
    /// of the interval
    pub fn should_report(&self, old: u64, new: u64) -> bool {
        self.interval > 0 && new / self.interval > old / self.interval
    }
}

impl Progress for ProgressLog {
    fn inc(&self, i: u64) {
        let old = self.count.get();
        let new = old + i;
        self.count.set(new);
        if self.should_report(old, new) {
            info!("Processed {new} events...");
        }
    }

    fn finish(&self) {}
}
