//! Generate (or measure) gauge-field configurations.
//!
//! Usage: `lattice-metropolis <config.json>`. Built with `mpi-support`, run it
//! under `mpirun`; otherwise it runs as a single process.

use lattice_metropolis::algs::communicator::Communicator;
use lattice_metropolis::config::RunConfig;
use lattice_metropolis::gauge_error::GaugeError;
use lattice_metropolis::run::Run;
use std::process::ExitCode;

fn run_with<C: Communicator>(cfg: &RunConfig, comm: &C) -> ExitCode {
    let result = Run::new(cfg, comm).and_then(|mut run| run.execute());
    match result {
        Ok(summary) => {
            if comm.rank() == 0 {
                log::info!("{} measurements", summary.plaquettes.len());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("rank {}: {e}", comm.rank());
            comm.abort(1);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: lattice-metropolis <config.json>");
        return ExitCode::FAILURE;
    };
    let cfg = match RunConfig::load(&path) {
        Ok(cfg) => cfg,
        Err(e) => return report(e),
    };

    #[cfg(feature = "mpi-support")]
    let comm = match lattice_metropolis::algs::communicator::MpiComm::new() {
        Ok(c) => c,
        Err(e) => return report(e),
    };
    #[cfg(not(feature = "mpi-support"))]
    let comm = lattice_metropolis::algs::communicator::NoComm;
    run_with(&cfg, &comm)
}

fn report(e: GaugeError) -> ExitCode {
    log::error!("{e}");
    ExitCode::FAILURE
}
