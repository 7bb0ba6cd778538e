//! Lattice geometry, coordinate indexing and the Cartesian process grid.

pub mod geometry;
pub mod index;
pub mod process_grid;

pub use geometry::LatticeGeometry;
pub use index::Index;
pub use process_grid::ProcessTopology;

/// Number of space-time dimensions.
pub const NDIM: usize = 4;

/// A 4D site coordinate, one entry per axis (x, y, z, t).
pub type Site = [usize; NDIM];

/// Sign of a one-site step along an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Forward, Direction::Backward];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Slot of this direction in a per-axis pair.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }
}

/// Iterate over every site of a box with the given extents in storage order.
pub fn sites(extents: [usize; NDIM]) -> impl Iterator<Item = Site> {
    itertools::iproduct!(0..extents[0], 0..extents[1], 0..extents[2], 0..extents[3])
        .map(|(x, y, z, t)| [x, y, z, t])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sites_follow_storage_order() {
        let ext = [3, 3, 4, 5];
        for (i, s) in sites(ext).enumerate() {
            assert_eq!(index::linear_index(s, ext), i);
        }
        assert_eq!(sites(ext).count(), 180);
    }
}
