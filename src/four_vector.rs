use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

/// A basic four-vector
///
/// The zero component is the energy/time component. The remainder are
/// the spatial components
#[derive(
    Deserialize,
    Serialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Clone,
    Copy,
    Default,
)]
pub struct FourVector {
    p: [N64; 4],
}

impl FourVector {
    /// Construct a four-vector from transverse momentum, pseudorapidity,
    /// azimuth, and energy
    ///
    /// Returns `None` if any of the resulting components is not finite.
    pub fn try_from_pt_eta_phi_e(
        pt: f64,
        eta: f64,
        phi: f64,
        e: f64,
    ) -> Option<Self> {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let p = [e, px, py, pz];
        if !p.iter().all(|x| x.is_finite()) {
            return None;
        }
        Some(p.map(n64).into())
    }

    /// The square \sum v_i^2 with i = 1,2,3 of the spatial norm
    pub fn spatial_norm_sq(&self) -> f64 {
        self.p.iter().skip(1).map(|&e| f64::from(e).powi(2)).sum()
    }

    const fn len() -> usize {
        4
    }

    /// The invariant mass \sqrt{v_0^2 - \sum v_i^2} with i = 1,2,3
    ///
    /// Returns `None` for space-like vectors, where the invariant mass
    /// square is negative, and if the mass square is not finite.
    pub fn m(&self) -> Option<N64> {
        let m_sq = self.m_sq();
        if m_sq.is_finite() && m_sq >= 0. {
            Some(n64(m_sq.sqrt()))
        } else {
            None
        }
    }

    /// The invariant mass square v_0^2 - \sum v_i^2 with i = 1,2,3
    ///
    /// Large components can overflow, so the result is not
    /// necessarily finite.
    pub fn m_sq(&self) -> f64 {
        f64::from(self.p[0]).powi(2) - self.spatial_norm_sq()
    }
}

impl std::convert::From<[N64; 4]> for FourVector {
    fn from(p: [N64; 4]) -> FourVector {
        FourVector { p }
    }
}

impl std::ops::Index<usize> for FourVector {
    type Output = N64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.p[i]
    }
}

impl std::ops::AddAssign for FourVector {
    fn add_assign(&mut self, rhs: FourVector) {
        for i in 0..Self::len() {
            self.p[i] += rhs[i]
        }
    }
}

impl std::ops::Add for FourVector {
    type Output = Self;

    fn add(mut self, rhs: FourVector) -> Self::Output {
        self += rhs;
        self
    }
}
