use std::fmt::{self, Display};

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{EventRecord, Photon, PhotonCandidate};

/// Default minimum photon transverse momentum in MeV
pub const DEFAULT_MIN_PT: f64 = 15_000.;
/// Default pseudorapidity acceptance
pub const DEFAULT_MAX_ABS_ETA: f64 = 2.37;
/// Default lower edge of the calorimeter transition region
pub const DEFAULT_CRACK_LOW: f64 = 1.37;
/// Default upper edge of the calorimeter transition region
pub const DEFAULT_CRACK_HIGH: f64 = 1.52;
/// Default maximum ratio of cone activity to photon transverse momentum
pub const DEFAULT_MAX_ISOLATION: f64 = 0.065;

/// Cuts defining a good, isolated photon
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhotonCuts {
    /// Minimum transverse momentum in MeV (exclusive)
    pub min_pt: f64,
    /// Maximum absolute pseudorapidity (exclusive)
    pub max_abs_eta: f64,
    /// Lower edge of the excluded pseudorapidity region (excluded)
    pub crack_low: f64,
    /// Upper edge of the excluded pseudorapidity region (excluded)
    pub crack_high: f64,
    /// Maximum cone activity relative to the photon transverse momentum
    /// (exclusive)
    pub max_isolation: f64,
}

impl Default for PhotonCuts {
    fn default() -> Self {
        Self {
            min_pt: DEFAULT_MIN_PT,
            max_abs_eta: DEFAULT_MAX_ABS_ETA,
            crack_low: DEFAULT_CRACK_LOW,
            crack_high: DEFAULT_CRACK_HIGH,
            max_isolation: DEFAULT_MAX_ISOLATION,
        }
    }
}

impl PhotonCuts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum transverse momentum in MeV
    pub fn with_min_pt(mut self, min_pt: f64) -> Self {
        self.min_pt = min_pt;
        self
    }

    /// Set the pseudorapidity acceptance
    pub fn with_max_abs_eta(mut self, max_abs_eta: f64) -> Self {
        self.max_abs_eta = max_abs_eta;
        self
    }

    /// Set the excluded calorimeter transition region
    pub fn with_crack(mut self, low: f64, high: f64) -> Self {
        self.crack_low = low;
        self.crack_high = high;
        self
    }

    /// Set the maximum relative cone activity
    pub fn with_max_isolation(mut self, max_isolation: f64) -> Self {
        self.max_isolation = max_isolation;
        self
    }

    /// Whether a photon passes the identification and kinematic cuts
    pub fn is_good(&self, photon: &Photon) -> bool {
        let abs_eta = photon.eta.abs();
        photon.is_tight_id
            && photon.pt > self.min_pt
            && abs_eta < self.max_abs_eta
            && (abs_eta < self.crack_low || abs_eta > self.crack_high)
    }

    /// Whether a photon passes both isolation cuts
    pub fn is_isolated(&self, photon: &Photon) -> Result<bool, NumericError> {
        let pt = photon.pt;
        if !(pt > 0. && pt.is_finite()) {
            return Err(NumericError::IsolationDenominator(pt));
        }
        let track_iso = photon.ptcone30 / pt;
        let calo_iso = photon.etcone20 / pt;
        if !track_iso.is_finite() || !calo_iso.is_finite() {
            return Err(NumericError::IsolationRatio(track_iso, calo_iso));
        }
        Ok(track_iso < self.max_isolation && calo_iso < self.max_isolation)
    }
}

/// Why an event was rejected
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rejection {
    /// The trigger did not fire
    Trigger,
    /// The number of good photons is not exactly two
    Multiplicity(usize),
    /// At least one of the two good photons is not isolated
    Isolation,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Trigger => write!(f, "trigger"),
            Rejection::Multiplicity(n) => write!(f, "photon multiplicity {n}"),
            Rejection::Isolation => write!(f, "isolation"),
        }
    }
}

/// Outcome of the event selection
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Selection {
    /// The event passes, with the indices of the two photons
    /// in encounter order
    Passed([usize; 2]),
    Rejected(Rejection),
}

impl Selection {
    pub fn passed(&self) -> bool {
        matches!(self, Selection::Passed(_))
    }
}

/// Invalid numerical input encountered while processing an event
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error("Isolation requires a positive finite transverse momentum, got {0}")]
    IsolationDenominator(f64),
    #[error("Isolation ratios {0} and {1} are not finite")]
    IsolationRatio(f64, f64),
    #[error("Photon kinematics are not finite")]
    NotANumber,
    #[error("Negative invariant mass square {0}")]
    NegativeMassSquare(f64),
    #[error("Invariant mass square is not finite")]
    MassOverflow,
}

/// Selection of events with exactly two good, isolated photons
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PhotonSelector {
    cuts: PhotonCuts,
}

impl PhotonSelector {
    pub fn new(cuts: PhotonCuts) -> Self {
        Self { cuts }
    }

    pub fn cuts(&self) -> &PhotonCuts {
        &self.cuts
    }

    /// Photons passing the identification and kinematic cuts,
    /// in storage order
    pub fn good_photons<'a>(
        &self,
        event: &'a EventRecord,
    ) -> Vec<PhotonCandidate<'a>> {
        event
            .candidates()
            .filter(|c| self.cuts.is_good(c.photon))
            .collect()
    }

    /// Apply the full cut sequence to an event
    pub fn select(&self, event: &EventRecord) -> Result<Selection, NumericError> {
        use Rejection::*;

        if !event.trigger() {
            trace!("trigger did not fire");
            return Ok(Selection::Rejected(Trigger));
        }
        let good = self.good_photons(event);
        let [first, second] = good.as_slice() else {
            trace!("found {} good photons", good.len());
            return Ok(Selection::Rejected(Multiplicity(good.len())));
        };
        for candidate in [first, second] {
            if !self.cuts.is_isolated(candidate.photon)? {
                trace!("photon {} is not isolated", candidate.index);
                return Ok(Selection::Rejected(Isolation));
            }
        }
        Ok(Selection::Passed([first.index, second.index]))
    }
}
