//! Cartesian process grid with periodic face neighbors.
//!
//! Ranks map to grid coordinates with the same last-axis-fastest ordering as
//! lattice sites. Neighbor lookups are pure functions of a rank, so two
//! lookups compose into the rank two hops away, which is what the diagonal
//! link exchange addresses.

use crate::gauge_error::GaugeError;
use crate::topology::index::{linear_index, site_of};
use crate::topology::{Direction, NDIM};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessTopology {
    rank: usize,
    num_procs: usize,
    shape: [usize; NDIM],
    coord: [usize; NDIM],
    /// `neighbors[axis][direction.slot()]`
    neighbors: [[usize; 2]; NDIM],
}

impl ProcessTopology {
    /// Build the topology for `rank` of `num_procs` on a grid of `shape`.
    ///
    /// # Errors
    /// `GaugeError::Configuration` if `shape` does not hold exactly
    /// `num_procs` ranks or `rank` is out of range.
    pub fn new(rank: usize, num_procs: usize, shape: [usize; NDIM]) -> Result<Self, GaugeError> {
        let product: usize = shape.iter().product();
        if product != num_procs || num_procs == 0 {
            return Err(GaugeError::Configuration(format!(
                "process grid {shape:?} does not match {num_procs} processes"
            )));
        }
        if rank >= num_procs {
            return Err(GaugeError::Configuration(format!(
                "rank {rank} outside a world of {num_procs}"
            )));
        }
        let coord = site_of(rank, shape);
        let mut neighbors = [[0usize; 2]; NDIM];
        for (axis, pair) in neighbors.iter_mut().enumerate() {
            for dir in Direction::BOTH {
                pair[dir.slot()] = step(coord, shape, axis, dir);
            }
        }
        log::debug!("rank {rank}: grid coordinate {coord:?}, neighbors {neighbors:?}");
        Ok(Self {
            rank,
            num_procs,
            shape,
            coord,
            neighbors,
        })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn num_procs(&self) -> usize {
        self.num_procs
    }

    pub fn shape(&self) -> [usize; NDIM] {
        self.shape
    }

    /// This rank's position on the process grid.
    pub fn grid_coord(&self) -> [usize; NDIM] {
        self.coord
    }

    /// Face neighbor of this rank.
    #[inline]
    pub fn face_neighbor(&self, axis: usize, dir: Direction) -> usize {
        self.neighbors[axis][dir.slot()]
    }

    /// Face neighbor of an arbitrary `rank`. Composable.
    #[inline]
    pub fn neighbor(&self, rank: usize, axis: usize, dir: Direction) -> usize {
        if rank == self.rank {
            return self.face_neighbor(axis, dir);
        }
        step(site_of(rank, self.shape), self.shape, axis, dir)
    }

    /// Rank reached by one step along `axis_a` then one along `axis_b`.
    pub fn diagonal_neighbor(
        &self,
        axis_a: usize,
        dir_a: Direction,
        axis_b: usize,
        dir_b: Direction,
    ) -> usize {
        self.neighbor(self.face_neighbor(axis_a, dir_a), axis_b, dir_b)
    }

    /// `true` when the grid has a single process along `axis`.
    pub fn is_self_neighbor(&self, axis: usize) -> bool {
        self.shape[axis] == 1
    }

    /// Rank owning grid coordinate `coord`.
    pub fn rank_of(&self, coord: [usize; NDIM]) -> usize {
        linear_index(coord, self.shape)
    }
}

fn step(mut coord: [usize; NDIM], shape: [usize; NDIM], axis: usize, dir: Direction) -> usize {
    let p = shape[axis];
    coord[axis] = match dir {
        Direction::Forward => (coord[axis] + 1) % p,
        Direction::Backward => (coord[axis] + p - 1) % p,
    };
    linear_index(coord, shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_shape() {
        assert!(matches!(
            ProcessTopology::new(0, 6, [2, 2, 1, 1]),
            Err(GaugeError::Configuration(_))
        ));
        assert!(ProcessTopology::new(4, 4, [2, 2, 1, 1]).is_err());
    }

    #[test]
    fn forward_and_backward_are_inverse() {
        let shape = [2, 3, 1, 4];
        for r in 0..24 {
            let topo = ProcessTopology::new(r, 24, shape).unwrap();
            for axis in 0..NDIM {
                let f = topo.face_neighbor(axis, Direction::Forward);
                assert_eq!(topo.neighbor(f, axis, Direction::Backward), r);
            }
        }
    }

    #[test]
    fn single_process_axis_points_at_self() {
        let topo = ProcessTopology::new(1, 2, [1, 2, 1, 1]).unwrap();
        assert!(topo.is_self_neighbor(0));
        assert_eq!(topo.face_neighbor(0, Direction::Forward), 1);
        assert_eq!(topo.face_neighbor(0, Direction::Backward), 1);
        assert_eq!(topo.face_neighbor(1, Direction::Forward), 0);
        assert_eq!(topo.face_neighbor(1, Direction::Backward), 0);
    }

    #[test]
    fn composition_commutes_on_the_torus() {
        let shape = [2, 2, 2, 2];
        let topo = ProcessTopology::new(5, 16, shape).unwrap();
        let ab = topo.diagonal_neighbor(0, Direction::Forward, 3, Direction::Backward);
        let ba = topo.diagonal_neighbor(3, Direction::Backward, 0, Direction::Forward);
        assert_eq!(ab, ba);
        let mut c = topo.grid_coord();
        c[0] = (c[0] + 1) % 2;
        c[3] = (c[3] + 1) % 2;
        assert_eq!(topo.rank_of(c), ab);
    }
}
