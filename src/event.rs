use std::convert::From;
use std::default::Default;

use serde::{Deserialize, Serialize};

/// Reconstructed photon as stored in the event record
///
/// Momenta and energies are in MeV.
#[derive(Deserialize, Serialize, PartialEq, Debug, Clone, Copy, Default)]
pub struct Photon {
    /// Whether the photon passes the tight identification criteria
    pub is_tight_id: bool,
    /// Transverse momentum
    pub pt: f64,
    /// Pseudorapidity
    pub eta: f64,
    /// Azimuthal angle
    pub phi: f64,
    /// Energy
    pub e: f64,
    /// Scalar sum of track transverse momenta in a cone with ΔR = 0.3
    pub ptcone30: f64,
    /// Calorimeter transverse energy in a cone with ΔR = 0.2
    pub etcone20: f64,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct EventBuilder {
    trigger: bool,
    photons: Vec<Photon>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            trigger: false,
            photons: Vec::with_capacity(cap),
        }
    }

    pub fn trigger(&mut self, trigger: bool) -> &mut Self {
        self.trigger = trigger;
        self
    }

    pub fn add_photon(&mut self, photon: Photon) -> &mut Self {
        self.photons.push(photon);
        self
    }

    pub fn build(self) -> EventRecord {
        EventRecord {
            trigger: self.trigger,
            photons: self.photons,
        }
    }
}

impl From<EventBuilder> for EventRecord {
    fn from(b: EventBuilder) -> Self {
        b.build()
    }
}

/// A single collision event
#[derive(PartialEq, Debug, Clone, Default)]
pub struct EventRecord {
    trigger: bool,
    photons: Vec<Photon>,
}

impl EventRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the diphoton trigger fired
    pub fn trigger(&self) -> bool {
        self.trigger
    }

    pub fn photon_count(&self) -> usize {
        self.photons.len()
    }

    pub fn photons(&self) -> &[Photon] {
        self.photons.as_slice()
    }

    /// The photon with the given index
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not smaller than [photon_count](Self::photon_count).
    pub fn photon(&self, idx: usize) -> &Photon {
        &self.photons[idx]
    }

    /// Iterate over photon candidates in storage order
    pub fn candidates(&self) -> impl Iterator<Item = PhotonCandidate<'_>> {
        self.photons
            .iter()
            .enumerate()
            .map(|(index, photon)| PhotonCandidate { index, photon })
    }
}

/// A photon considered for selection, together with its position
/// in the event record
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct PhotonCandidate<'a> {
    pub index: usize,
    pub photon: &'a Photon,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build() {
        let photon = Photon {
            is_tight_id: true,
            pt: 20_000.,
            ..Default::default()
        };
        let mut builder = EventBuilder::with_capacity(2);
        builder.trigger(true).add_photon(photon).add_photon(Photon::default());
        let event: EventRecord = builder.into();
        assert!(event.trigger());
        assert_eq!(event.photon_count(), 2);
        assert_eq!(event.photon(0), &photon);
        let indices: Vec<_> = event.candidates().map(|c| c.index).collect();
        assert_eq!(indices, [0, 1]);
    }

    #[test]
    fn empty() {
        let event = EventRecord::new();
        assert!(!event.trigger());
        assert_eq!(event.photon_count(), 0);
        assert_eq!(event.candidates().count(), 0);
    }
}
