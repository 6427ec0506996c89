use crate::{analysis::RunStats, histogram::FinalHistogram};

/// Progress indicator
pub trait Progress {
    fn inc(&self, i: u64);
    fn finish(&self);
}

/// Consumer of the final analysis results
pub trait Output {
    type Error;

    fn output(
        &mut self,
        hist: &FinalHistogram,
        stats: &RunStats,
    ) -> Result<(), Self::Error>;
}

impl<T: Output + ?Sized> Output for &mut T {
    type Error = T::Error;

    fn output(
        &mut self,
        hist: &FinalHistogram,
        stats: &RunStats,
    ) -> Result<(), Self::Error> {
        (**self).output(hist, stats)
    }
}
