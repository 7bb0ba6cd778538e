#![cfg_attr(docsrs, feature(doc_cfg))]
//! # lattice-metropolis
//!
//! lattice-metropolis generates ensembles of SU(3) gauge-field configurations
//! with the Metropolis algorithm on a 4-dimensional periodic lattice that is
//! split into equal sub-lattices, one per cooperating process.
//!
//! ## Features
//! - Cartesian domain decomposition with periodic, composable neighbor lookups
//! - Boundary-link exchange, including links two hops away across a corner,
//!   with at most one paired message per lookup
//! - Wilson gauge action and a Metropolis sweep written against a
//!   [`action::GaugeAction`] trait
//! - Average plaquette, total action and gauge transformations for checking
//!   a run
//! - Configuration files with a process-count independent layout, written and
//!   read positionally by every process
//! - Pluggable transport: single process, in-process threads (for tests) and
//!   MPI behind the `mpi-support` feature
//!
//! ## Determinism
//!
//! Every random draw comes from a `SmallRng` seeded from the run
//! configuration and the process rank, so runs with the same seed, geometry
//! and process count are reproducible.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! lattice-metropolis = "0.3"
//! # Optional features:
//! # features = ["mpi-support", "rayon"]
//! ```

pub mod action;
pub mod algs;
pub mod config;
pub mod data;
pub mod gauge_error;
pub mod io;
pub mod observables;
pub mod run;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::action::{GaugeAction, WilsonGaugeAction};
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::exchange::LinkExchange;
    pub use crate::algs::metropolis::{MetropolisUpdater, SweepStats};
    pub use crate::config::{FileFormat, RunConfig, StartKind};
    pub use crate::data::field::LatticeField;
    pub use crate::data::generator::{GroupElementGenerator, Su3Generator};
    pub use crate::data::su3::Su3;
    pub use crate::gauge_error::GaugeError;
    pub use crate::run::{Run, RunSummary};
    pub use crate::topology::{Direction, LatticeGeometry, ProcessTopology, Site};
}
