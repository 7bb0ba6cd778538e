//! Fixed little-endian wire record for one link variable.

use crate::data::su3::{SU3_REALS, Su3};
use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

/// One link as 18 IEEE-754 doubles, stored pre-LE with `.to_le()` on the bit
/// pattern and decoded with `.from_le()`.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct WireLink {
    pub reals_le: [u64; SU3_REALS],
}

/// Bytes of one serialized link.
pub const LINK_BYTES: usize = SU3_REALS * 8;

const_assert_eq!(std::mem::size_of::<WireLink>(), LINK_BYTES);

impl WireLink {
    pub fn of(u: &Su3) -> Self {
        let mut reals_le = [0u64; SU3_REALS];
        for (w, r) in reals_le.iter_mut().zip(u.to_reals()) {
            *w = r.to_bits().to_le();
        }
        Self { reals_le }
    }

    pub fn get(&self) -> Su3 {
        let mut reals = [0.0; SU3_REALS];
        for (r, w) in reals.iter_mut().zip(self.reals_le) {
            *r = f64::from_bits(u64::from_le(w));
        }
        Su3::from_reals(&reals)
    }
}
