//! Coordinate ↔ offset bijections for the local sub-lattice and the global
//! lattice.
//!
//! Both orderings make the last axis vary fastest:
//! `index = t + N[3]·(z + N[2]·(y + N[1]·x))`. The global ordering does not
//! depend on the process count, so configuration files written by runs with
//! different decompositions are byte-identical.

use crate::topology::{Direction, NDIM, Site};

/// Linear index of `site` in a box of the given `extents`.
#[inline]
pub fn linear_index(site: Site, extents: [usize; NDIM]) -> usize {
    debug_assert!(
        site.iter().zip(extents.iter()).all(|(s, n)| s < n),
        "site {site:?} outside extents {extents:?}"
    );
    site[3] + extents[3] * (site[2] + extents[2] * (site[1] + extents[1] * site[0]))
}

/// Inverse of [`linear_index`].
#[inline]
pub fn site_of(mut index: usize, extents: [usize; NDIM]) -> Site {
    let mut site = [0usize; NDIM];
    for axis in (0..NDIM).rev() {
        site[axis] = index % extents[axis];
        index /= extents[axis];
    }
    site
}

/// Index bijections for one process's sub-lattice inside the global lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Index {
    local: [usize; NDIM],
    global: [usize; NDIM],
}

impl Index {
    pub fn new(local: [usize; NDIM], global: [usize; NDIM]) -> Self {
        Self { local, global }
    }

    pub fn local_extents(&self) -> [usize; NDIM] {
        self.local
    }

    pub fn global_extents(&self) -> [usize; NDIM] {
        self.global
    }

    pub fn local_volume(&self) -> usize {
        self.local.iter().product()
    }

    pub fn global_volume(&self) -> usize {
        self.global.iter().product()
    }

    #[inline]
    pub fn local_index(&self, site: Site) -> usize {
        linear_index(site, self.local)
    }

    #[inline]
    pub fn local_site(&self, index: usize) -> Site {
        site_of(index, self.local)
    }

    #[inline]
    pub fn global_index(&self, site: Site) -> usize {
        linear_index(site, self.global)
    }

    #[inline]
    pub fn global_site(&self, index: usize) -> Site {
        site_of(index, self.global)
    }

    /// Global coordinate of a local `site` on the process at `grid_coord`.
    pub fn to_global(&self, site: Site, grid_coord: [usize; NDIM]) -> Site {
        let mut g = site;
        for axis in 0..NDIM {
            g[axis] += grid_coord[axis] * self.local[axis];
        }
        g
    }

    /// `true` when stepping one site along `axis` leaves the local box.
    #[inline]
    pub fn crosses(&self, site: Site, axis: usize, dir: Direction) -> bool {
        match dir {
            Direction::Forward => site[axis] + 1 == self.local[axis],
            Direction::Backward => site[axis] == 0,
        }
    }

    /// Periodic one-step shift inside the local box.
    ///
    /// When [`Index::crosses`] is true the result is the coordinate that the
    /// neighboring process holds the wanted link at.
    #[inline]
    pub fn shifted(&self, mut site: Site, axis: usize, dir: Direction) -> Site {
        let n = self.local[axis];
        site[axis] = match dir {
            Direction::Forward => (site[axis] + 1) % n,
            Direction::Backward => (site[axis] + n - 1) % n,
        };
        site
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_axis_is_fastest() {
        let idx = Index::new([3, 4, 5, 6], [6, 8, 10, 12]);
        assert_eq!(idx.local_index([0, 0, 0, 1]), 1);
        assert_eq!(idx.local_index([0, 0, 1, 0]), 6);
        assert_eq!(idx.local_index([0, 1, 0, 0]), 30);
        assert_eq!(idx.local_index([1, 0, 0, 0]), 120);
        assert_eq!(idx.local_index([2, 3, 4, 5]), idx.local_volume() - 1);
    }

    #[test]
    fn global_coordinate_offsets_by_grid_position() {
        let idx = Index::new([4, 4, 4, 4], [8, 8, 8, 8]);
        assert_eq!(idx.to_global([1, 2, 3, 0], [1, 0, 1, 1]), [5, 2, 7, 4]);
    }

    #[test]
    fn shift_wraps_on_both_faces() {
        let idx = Index::new([3, 3, 3, 3], [3, 3, 3, 3]);
        assert!(idx.crosses([2, 0, 0, 0], 0, Direction::Forward));
        assert!(!idx.crosses([1, 0, 0, 0], 0, Direction::Forward));
        assert!(idx.crosses([0, 0, 0, 0], 3, Direction::Backward));
        assert_eq!(idx.shifted([2, 1, 1, 1], 0, Direction::Forward), [0, 1, 1, 1]);
        assert_eq!(idx.shifted([0, 1, 1, 0], 3, Direction::Backward), [0, 1, 1, 2]);
        assert_eq!(idx.shifted([0, 1, 1, 1], 3, Direction::Backward), [0, 1, 1, 0]);
    }
}
