//! Random SU(3) group elements.
//!
//! The Metropolis updater only sees [`GroupElementGenerator`]; [`Su3Generator`]
//! is the seeded implementation used by runs and tests.

use crate::data::su3::{Su3, conj_cross};
use crate::gauge_error::GaugeError;
use num_complex::Complex64;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub trait GroupElementGenerator {
    /// Uniformly distributed SU(3) element.
    fn random_su3(&mut self) -> Su3;
    /// SU(3) element concentrated around the identity.
    fn near_identity(&mut self) -> Su3;
}

/// Seeded generator with spread `epsilon` for near-identity elements.
#[derive(Clone, Debug)]
pub struct Su3Generator {
    rng: SmallRng,
    epsilon: f64,
}

impl Su3Generator {
    /// # Errors
    /// `GaugeError::Configuration` if `epsilon` is outside `(0, 1)`.
    pub fn new(seed: u64, epsilon: f64) -> Result<Self, GaugeError> {
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(GaugeError::Configuration(format!(
                "SU(3) spread must lie in (0, 1), got {epsilon}"
            )));
        }
        Ok(Self {
            rng: SmallRng::seed_from_u64(seed),
            epsilon,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// SU(2) element `x0·1 + i·x⃗·σ⃗` with `|x⃗| = epsilon`, as
    /// `[[a, b], [-b*, a*]]`.
    fn su2_near_identity(&mut self) -> [[Complex64; 2]; 2] {
        let mut r = [0.0f64; 3];
        for v in r.iter_mut() {
            *v = self.rng.gen_range(-0.5..0.5);
        }
        let norm = r.iter().map(|v| v * v).sum::<f64>().sqrt();
        let x0 = (1.0 - self.epsilon * self.epsilon).sqrt();
        let x: [f64; 3] = if norm > 0.0 {
            [
                self.epsilon * r[0] / norm,
                self.epsilon * r[1] / norm,
                self.epsilon * r[2] / norm,
            ]
        } else {
            [0.0, 0.0, self.epsilon]
        };
        let a = Complex64::new(x0, x[2]);
        let b = Complex64::new(x[1], x[0]);
        [[a, b], [-b.conj(), a.conj()]]
    }

    /// Embed an SU(2) element into the (`i`, `j`) block of an SU(3) identity.
    fn embed(su2: [[Complex64; 2]; 2], i: usize, j: usize) -> Su3 {
        let mut u = Su3::IDENTITY;
        u.m[i][i] = su2[0][0];
        u.m[i][j] = su2[0][1];
        u.m[j][i] = su2[1][0];
        u.m[j][j] = su2[1][1];
        u
    }
}

impl GroupElementGenerator for Su3Generator {
    fn random_su3(&mut self) -> Su3 {
        let mut rows = [[Complex64::new(0.0, 0.0); 3]; 3];
        for row in rows.iter_mut().take(2) {
            for c in row.iter_mut() {
                *c = Complex64::new(self.rng.gen_range(-1.0..1.0), self.rng.gen_range(-1.0..1.0));
            }
        }
        rows[2] = conj_cross(&rows[0], &rows[1]);
        Su3 { m: rows }.reunitarize()
    }

    fn near_identity(&mut self) -> Su3 {
        let r = Self::embed(self.su2_near_identity(), 0, 1);
        let s = Self::embed(self.su2_near_identity(), 0, 2);
        let t = Self::embed(self.su2_near_identity(), 1, 2);
        let x = r * s * t;
        if self.rng.gen_range(-0.5..0.5) < 0.0 {
            x.adjoint()
        } else {
            x
        }
    }
}
