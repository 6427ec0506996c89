use log::warn;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of bins of the diphoton mass histogram
pub const DEFAULT_NBINS: usize = 30;
/// Default lower edge of the diphoton mass histogram in GeV
pub const DEFAULT_LOW: f64 = 105.;
/// Default upper edge of the diphoton mass histogram in GeV
pub const DEFAULT_HIGH: f64 = 160.;

/// Labels attached to a histogram for output
#[derive(Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Labels {
    pub name: String,
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            name: "h_M_Hyy".to_owned(),
            title: "Diphoton invariant mass".to_owned(),
            x_axis: "Invariant mass m_γγ [GeV]".to_owned(),
            y_axis: "events".to_owned(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum BinningError {
    #[error("Histogram needs at least one bin")]
    NoBins,
    #[error("Invalid histogram range [{0}, {1})")]
    BadRange(f64, f64),
}

/// One-dimensional histogram with equal-width bins
///
/// Each bin covers the half-open interval `[low + k * width, low +
/// (k + 1) * width)`. Values outside the range are counted as
/// underflow and overflow.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    labels: Labels,
    low: f64,
    high: f64,
    bins: Vec<u64>,
    underflow: u64,
    overflow: u64,
}

impl Histogram {
    /// A new, empty histogram
    pub fn new(nbins: usize, low: f64, high: f64) -> Result<Self, BinningError> {
        if nbins == 0 {
            return Err(BinningError::NoBins);
        }
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(BinningError::BadRange(low, high));
        }
        Ok(Self {
            labels: Labels::default(),
            low,
            high,
            bins: vec![0; nbins],
            underflow: 0,
            overflow: 0,
        })
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn nbins(&self) -> usize {
        self.bins.len()
    }

    fn width(&self) -> f64 {
        (self.high - self.low) / self.nbins() as f64
    }

    fn edge(&self, k: usize) -> f64 {
        if k == self.nbins() {
            self.high
        } else {
            self.low + k as f64 * self.width()
        }
    }

    /// Index of the bin containing `value`, if any
    pub fn bin_index(&self, value: N64) -> Option<usize> {
        let value = value.raw();
        if value.is_nan() || value < self.low || value >= self.high {
            return None;
        }
        let estimate = ((value - self.low) / self.width()) as usize;
        let mut k = std::cmp::min(estimate, self.nbins() - 1);
        // correct for rounding in the estimate
        if value < self.edge(k) {
            k -= 1;
        } else if value >= self.edge(k + 1) {
            k += 1;
        }
        Some(k)
    }

    /// Count one entry
    ///
    /// Infinite values go to the underflow or overflow. NaN, which
    /// can only occur if `value` was created unchecked, is not
    /// counted.
    pub fn fill(&mut self, value: N64) {
        let raw = value.raw();
        if raw.is_nan() {
            warn!("Ignoring NaN histogram entry");
            return;
        }
        match self.bin_index(value) {
            Some(k) => self.bins[k] += 1,
            None if raw < self.low => self.underflow += 1,
            None => self.overflow += 1,
        }
    }

    /// Total number of fills, including underflow and overflow
    pub fn entries(&self) -> u64 {
        self.bins.iter().sum::<u64>() + self.underflow + self.overflow
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Freeze the histogram for output
    pub fn finalize(self) -> FinalHistogram {
        let edges = (0..=self.nbins()).map(|k| self.edge(k)).collect();
        let errors = self.bins.iter().map(|&n| (n as f64).sqrt()).collect();
        let entries = self.entries();
        FinalHistogram {
            labels: self.labels,
            edges,
            bins: self.bins,
            errors,
            underflow: self.underflow,
            overflow: self.overflow,
            entries,
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            labels: Labels::default(),
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
            bins: vec![0; DEFAULT_NBINS],
            underflow: 0,
            overflow: 0,
        }
    }
}

/// Read-only histogram produced at the end of a run
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct FinalHistogram {
    #[serde(flatten)]
    pub labels: Labels,
    /// Bin edges, one more than the number of bins
    pub edges: Vec<f64>,
    /// Counts per bin
    pub bins: Vec<u64>,
    /// Poisson uncertainties per bin
    pub errors: Vec<f64>,
    pub underflow: u64,
    pub overflow: u64,
    /// Total number of fills, including underflow and overflow
    pub entries: u64,
}

impl FinalHistogram {
    /// Bin centres
    pub fn centres(&self) -> impl Iterator<Item = f64> + '_ {
        self.edges.windows(2).map(|e| 0.5 * (e[0] + e[1]))
    }

    /// Largest bin count
    pub fn max_count(&self) -> u64 {
        self.bins.iter().copied().max().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binning() {
        assert_eq!(Histogram::new(0, 0., 1.), Err(BinningError::NoBins));
        assert_eq!(
            Histogram::new(1, 1., 1.),
            Err(BinningError::BadRange(1., 1.))
        );
        assert!(Histogram::new(1, f64::NEG_INFINITY, 1.).is_err());

        let hist = Histogram::default();
        assert_eq!(hist.nbins(), 30);
        assert_eq!(hist.entries(), 0);
    }

    #[test]
    fn half_open_bins() {
        let hist = Histogram::new(30, 105., 160.).unwrap();
        let width = 55. / 30.;
        assert_eq!(hist.bin_index(n64(104.999)), None);
        assert_eq!(hist.bin_index(n64(105.)), Some(0));
        assert_eq!(hist.bin_index(n64(159.999)), Some(29));
        assert_eq!(hist.bin_index(n64(160.)), None);
        for k in 0..30 {
            let edge = hist.edge(k);
            assert!((edge - (105. + k as f64 * width)).abs() < 1e-12);
            assert_eq!(hist.bin_index(n64(edge)), Some(k));
            assert_eq!(hist.bin_index(n64(0.5 * (edge + hist.edge(k + 1)))), Some(k));
        }
    }

    #[test]
    fn fill() {
        let mut hist = Histogram::new(5, 0., 5.).unwrap();
        for x in [-1., 0., 0.5, 2.2, 4.99, 5., 7.] {
            hist.fill(n64(x));
        }
        assert_eq!(hist.bins(), [2, 0, 1, 0, 1]);
        assert_eq!(hist.underflow(), 1);
        assert_eq!(hist.overflow(), 2);
        assert_eq!(hist.entries(), 7);
    }

    #[test]
    fn non_finite() {
        let mut hist = Histogram::new(5, 0., 5.).unwrap();
        hist.fill(n64(f64::INFINITY));
        hist.fill(n64(f64::NEG_INFINITY));
        assert_eq!(hist.overflow(), 1);
        assert_eq!(hist.underflow(), 1);

        let nan = N64::unchecked_new(f64::NAN);
        assert_eq!(hist.bin_index(nan), None);
        hist.fill(nan);
        assert_eq!(hist.bins(), [0; 5]);
        assert_eq!(hist.entries(), 2);
    }

    #[test]
    fn finalize() {
        let mut hist = Histogram::new(2, 0., 2.).unwrap();
        for _ in 0..4 {
            hist.fill(n64(1.5));
        }
        hist.fill(n64(-3.));
        let fin = hist.finalize();
        assert_eq!(fin.edges, [0., 1., 2.]);
        assert_eq!(fin.bins, [0, 4]);
        assert_eq!(fin.errors, [0., 2.]);
        assert_eq!(fin.underflow, 1);
        assert_eq!(fin.overflow, 0);
        assert_eq!(fin.entries, 5);
        assert_eq!(fin.max_count(), 4);
        assert_eq!(fin.centres().collect::<Vec<_>>(), [0.5, 1.5]);
        assert_eq!(fin.labels.name, "h_M_Hyy");
    }

    #[test]
    fn yaml() {
        let mut hist = Histogram::default();
        hist.fill(n64(125.));
        let fin = hist.finalize();
        let yaml = serde_yaml::to_string(&fin).unwrap();
        assert!(yaml.contains("name: h_M_Hyy"));
        let read: FinalHistogram = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(read, fin);
    }
}
