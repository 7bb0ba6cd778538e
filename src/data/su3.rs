//! SU(3) link variables.
//!
//! A link is a 3×3 complex matrix stored row-major. On disk and on the wire it
//! is 18 reals with real/imaginary parts interleaved per entry.

use num_complex::Complex64;
use num_traits::Zero;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Number of reals in one serialized link.
pub const SU3_REALS: usize = 18;

/// 3×3 complex matrix, row-major `m[row][col]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Su3 {
    pub m: [[Complex64; 3]; 3],
}

impl Default for Su3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

const C0: Complex64 = Complex64::new(0.0, 0.0);
const C1: Complex64 = Complex64::new(1.0, 0.0);

impl Su3 {
    pub const IDENTITY: Self = Self {
        m: [[C1, C0, C0], [C0, C1, C0], [C0, C0, C1]],
    };

    pub const ZERO: Self = Self { m: [[C0; 3]; 3] };

    /// Conjugate transpose. For SU(3) elements this is the inverse.
    pub fn adjoint(&self) -> Self {
        let mut r = Self::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                r.m[i][j] = self.m[j][i].conj();
            }
        }
        r
    }

    pub fn trace(&self) -> Complex64 {
        self.m[0][0] + self.m[1][1] + self.m[2][2]
    }

    /// Real part of the trace.
    pub fn re_trace(&self) -> f64 {
        self.m[0][0].re + self.m[1][1].re + self.m[2][2].re
    }

    /// Real part of `Tr(self · rhs)` without forming the full product.
    pub fn re_trace_product(&self, rhs: &Self) -> f64 {
        let mut s = 0.0;
        for i in 0..3 {
            for k in 0..3 {
                s += (self.m[i][k] * rhs.m[k][i]).re;
            }
        }
        s
    }

    pub fn det(&self) -> Complex64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    pub fn scale(&self, s: f64) -> Self {
        let mut r = *self;
        for row in r.m.iter_mut() {
            for c in row.iter_mut() {
                *c *= s;
            }
        }
        r
    }

    /// Largest absolute deviation of any real component from `other`.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.to_reals()
            .iter()
            .zip(other.to_reals().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    /// `‖U·U† − 1‖` in the max norm.
    pub fn unitarity_defect(&self) -> f64 {
        (*self * self.adjoint()).max_abs_diff(&Self::IDENTITY)
    }

    /// Re-project onto SU(3): Gram-Schmidt on the first two rows, third row
    /// as the conjugated cross product so that `det = 1`.
    pub fn reunitarize(&self) -> Self {
        let mut u = *self;
        normalize_row(&mut u.m[0]);
        let dot: Complex64 = (0..3).map(|j| u.m[0][j].conj() * u.m[1][j]).sum();
        for j in 0..3 {
            let r0 = u.m[0][j];
            u.m[1][j] -= r0 * dot;
        }
        normalize_row(&mut u.m[1]);
        u.m[2] = conj_cross(&u.m[0], &u.m[1]);
        u
    }

    /// Interleaved real/imaginary row-major reals.
    pub fn to_reals(&self) -> [f64; SU3_REALS] {
        let mut out = [0.0; SU3_REALS];
        for i in 0..3 {
            for j in 0..3 {
                out[6 * i + 2 * j] = self.m[i][j].re;
                out[6 * i + 2 * j + 1] = self.m[i][j].im;
            }
        }
        out
    }

    pub fn from_reals(v: &[f64; SU3_REALS]) -> Self {
        let mut r = Self::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                r.m[i][j] = Complex64::new(v[6 * i + 2 * j], v[6 * i + 2 * j + 1]);
            }
        }
        r
    }
}

fn normalize_row(row: &mut [Complex64; 3]) {
    let norm = row.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
    if norm > 0.0 {
        for c in row.iter_mut() {
            *c /= norm;
        }
    }
}

/// `conj(a × b)`: completes two orthonormal rows to a unit-determinant matrix.
pub(crate) fn conj_cross(a: &[Complex64; 3], b: &[Complex64; 3]) -> [Complex64; 3] {
    [
        (a[1] * b[2] - a[2] * b[1]).conj(),
        (a[2] * b[0] - a[0] * b[2]).conj(),
        (a[0] * b[1] - a[1] * b[0]).conj(),
    ]
}

impl Mul for Su3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut r = Self::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                let mut s = Complex64::zero();
                for k in 0..3 {
                    s += self.m[i][k] * rhs.m[k][j];
                }
                r.m[i][j] = s;
            }
        }
        r
    }
}

impl Add for Su3 {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for Su3 {
    fn add_assign(&mut self, rhs: Self) {
        for i in 0..3 {
            for j in 0..3 {
                self.m[i][j] += rhs.m[i][j];
            }
        }
    }
}

impl Sub for Su3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        let mut r = self;
        for i in 0..3 {
            for j in 0..3 {
                r.m[i][j] -= rhs.m[i][j];
            }
        }
        r
    }
}
