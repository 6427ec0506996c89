use noisy_float::prelude::*;

use crate::{
    event::{EventRecord, Photon},
    four_vector::FourVector,
    selection::NumericError,
};

const MEV_PER_GEV: f64 = 1000.;

/// Four-momentum of a photon in GeV
pub fn photon_momentum(photon: &Photon) -> Result<FourVector, NumericError> {
    let kinematics = [photon.pt, photon.eta, photon.phi, photon.e];
    if !kinematics.iter().all(|x| x.is_finite()) {
        return Err(NumericError::NotANumber);
    }
    FourVector::try_from_pt_eta_phi_e(
        photon.pt / MEV_PER_GEV,
        photon.eta,
        photon.phi,
        photon.e / MEV_PER_GEV,
    )
    .ok_or(NumericError::NotANumber)
}

/// Invariant mass in GeV of the system formed by two photons
pub fn invariant_mass(p1: &Photon, p2: &Photon) -> Result<N64, NumericError> {
    let total = photon_momentum(p1)? + photon_momentum(p2)?;
    total.m().ok_or_else(|| {
        let m_sq = total.m_sq();
        if m_sq.is_finite() {
            NumericError::NegativeMassSquare(m_sq)
        } else {
            NumericError::MassOverflow
        }
    })
}

/// Diphoton invariant mass in GeV for the photons with the given indices
///
/// # Panics
///
/// Panics if either index is out of range for the event.
pub fn diphoton_mass(
    event: &EventRecord,
    i1: usize,
    i2: usize,
) -> Result<N64, NumericError> {
    invariant_mass(event.photon(i1), event.photon(i2))
}
