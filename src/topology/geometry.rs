//! Validated global/local extents and process-grid shape.
//!
//! [`LatticeGeometry`] is built once at startup, before any communication is
//! set up, and is immutable afterwards.

use crate::gauge_error::GaugeError;
use crate::topology::NDIM;
use crate::topology::index::Index;
use serde::{Deserialize, Serialize};

/// Smallest admissible local extent along any axis.
pub const MIN_LOCAL_EXTENT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeGeometry {
    pub global: [usize; NDIM],
    pub local: [usize; NDIM],
    pub grid: [usize; NDIM],
}

impl LatticeGeometry {
    /// Build the geometry for `num_procs` processes.
    ///
    /// With `preset` the grid shape is taken as given; otherwise it is derived
    /// by [`auto_shape`].
    ///
    /// # Errors
    /// `GaugeError::Configuration` when the shape does not multiply to
    /// `num_procs`, an axis is not divisible, or a local extent is below
    /// [`MIN_LOCAL_EXTENT`].
    pub fn new(
        global: [usize; NDIM],
        num_procs: usize,
        preset: Option<[usize; NDIM]>,
    ) -> Result<Self, GaugeError> {
        if global.iter().any(|&n| n == 0) {
            return Err(GaugeError::Configuration(format!(
                "global extents must be positive, got {global:?}"
            )));
        }
        let grid = match preset {
            Some(g) => g,
            None => auto_shape(global, num_procs)?,
        };
        if grid.iter().any(|&p| p == 0) {
            return Err(GaugeError::Configuration(format!(
                "process grid {grid:?} has an empty axis"
            )));
        }
        let product: usize = grid.iter().product();
        if product != num_procs {
            return Err(GaugeError::Configuration(format!(
                "process grid {grid:?} holds {product} ranks but {num_procs} were started"
            )));
        }
        let mut local = [0usize; NDIM];
        for axis in 0..NDIM {
            if global[axis] % grid[axis] != 0 {
                return Err(GaugeError::Configuration(format!(
                    "axis {axis}: global extent {} is not divisible by {} processes",
                    global[axis], grid[axis]
                )));
            }
            local[axis] = global[axis] / grid[axis];
        }
        if let Some(axis) = (0..NDIM).find(|&a| local[a] < MIN_LOCAL_EXTENT) {
            return Err(GaugeError::Configuration(format!(
                "sub-lattice extent {} on axis {axis} is below {MIN_LOCAL_EXTENT}: {local:?}",
                local[axis]
            )));
        }
        Ok(Self {
            global,
            local,
            grid,
        })
    }

    /// Geometry for a single process holding the whole lattice.
    pub fn single(global: [usize; NDIM]) -> Result<Self, GaugeError> {
        Self::new(global, 1, Some([1; NDIM]))
    }

    pub fn num_procs(&self) -> usize {
        self.grid.iter().product()
    }

    pub fn index(&self) -> Index {
        Index::new(self.local, self.global)
    }

    pub fn local_volume(&self) -> usize {
        self.local.iter().product()
    }

    pub fn global_volume(&self) -> usize {
        self.global.iter().product()
    }
}

/// Default decomposition: halve the local extents axis by axis in x, y, z, t
/// order until every process has a block.
///
/// # Errors
/// Requires `num_procs` to be a power of two and every halved extent to
/// stay even.
pub fn auto_shape(global: [usize; NDIM], num_procs: usize) -> Result<[usize; NDIM], GaugeError> {
    if num_procs == 0 || !num_procs.is_power_of_two() {
        return Err(GaugeError::Configuration(format!(
            "automatic decomposition needs a power-of-two process count, got {num_procs}; \
             provide a preset process grid instead"
        )));
    }
    let mut grid = [1usize; NDIM];
    let mut local = global;
    let mut rest = num_procs;
    'outer: while rest >= 2 {
        for axis in 0..NDIM {
            if local[axis] % 2 != 0 {
                return Err(GaugeError::Configuration(format!(
                    "cannot halve axis {axis} of extent {} for {num_procs} processes",
                    local[axis]
                )));
            }
            local[axis] /= 2;
            grid[axis] *= 2;
            rest /= 2;
            if rest < 2 {
                break 'outer;
            }
        }
    }
    Ok(grid)
}
