//! Re-export public algorithms.

pub mod communicator;
pub mod exchange;
pub mod metropolis;
pub mod wire;

pub use communicator::{Communicator, NoComm, ThreadComm};
pub use exchange::LinkExchange;
pub use metropolis::{MetropolisUpdater, SweepStats};
