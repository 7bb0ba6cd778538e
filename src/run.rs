//! Run driver: initial field, thermalization, sampling and measuring stored
//! configurations.

use crate::action::WilsonGaugeAction;
use crate::algs::communicator::Communicator;
use crate::algs::exchange::LinkExchange;
use crate::algs::metropolis::{MetropolisUpdater, SweepStats};
use crate::config::{FileFormat, RunConfig, StartKind};
use crate::data::field::LatticeField;
use crate::data::generator::{GroupElementGenerator, Su3Generator};
use crate::gauge_error::GaugeError;
use crate::io::{self, ByteOrder};
use crate::observables::plaquette;
use crate::topology::geometry::LatticeGeometry;
use crate::topology::process_grid::ProcessTopology;
use log::{debug, info};
use std::path::PathBuf;

/// Mixed into the per-rank seed for the acceptance draws so that they do not
/// replay the candidate stream.
const ACCEPT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// What [`Run::execute`] measured.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Average plaquette per sampled or loaded configuration.
    pub plaquettes: Vec<f64>,
    /// Global counters over all sweeps of this run.
    pub acceptance: SweepStats,
}

pub struct Run<'c, C: Communicator> {
    cfg: RunConfig,
    geometry: LatticeGeometry,
    exchange: LinkExchange<'c, C>,
    field: LatticeField,
    updater: MetropolisUpdater<WilsonGaugeAction, Su3Generator>,
}

impl<'c, C: Communicator> Run<'c, C> {
    /// Validate the decomposition for `comm`'s world and build the initial
    /// field.
    pub fn new(cfg: &RunConfig, comm: &'c C) -> Result<Self, GaugeError> {
        cfg.validate()?;
        let geometry = cfg.geometry(comm.size())?;
        let topology = ProcessTopology::new(comm.rank(), comm.size(), geometry.grid)?;
        let exchange = LinkExchange::new(topology, comm)?;

        let rank_seed = cfg.seed.wrapping_add(comm.rank() as u64);
        let mut generator = Su3Generator::new(rank_seed, cfg.su3_eps)?;
        let field = match cfg.start {
            StartKind::Cold => LatticeField::cold(geometry.index()),
            StartKind::Hot => LatticeField::from_fn(geometry.index(), |_, _| generator.random_su3()),
            StartKind::NearIdentity => {
                LatticeField::from_fn(geometry.index(), |_, _| generator.near_identity())
            }
        };
        let updater = MetropolisUpdater::new(
            WilsonGaugeAction::new(cfg.beta),
            generator,
            cfg.n_updates,
            rank_seed ^ ACCEPT_SEED_SALT,
        );
        if comm.rank() == 0 {
            info!(
                "lattice {:?} on {} processes, grid {:?}, sub-lattice {:?}, beta {}",
                geometry.global,
                comm.size(),
                geometry.grid,
                geometry.local,
                cfg.beta
            );
        }
        Ok(Self {
            cfg: cfg.clone(),
            geometry,
            exchange,
            field,
            updater,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.cfg
    }

    pub fn geometry(&self) -> &LatticeGeometry {
        &self.geometry
    }

    pub fn exchange(&self) -> &LinkExchange<'c, C> {
        &self.exchange
    }

    pub fn field(&self) -> &LatticeField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut LatticeField {
        &mut self.field
    }

    fn is_root(&self) -> bool {
        self.exchange.comm().rank() == 0
    }

    /// One Metropolis sweep over the local sub-lattice.
    pub fn sweep(&mut self) -> Result<SweepStats, GaugeError> {
        self.updater.sweep(&mut self.field, &self.exchange)
    }

    pub fn plaquette(&self) -> Result<f64, GaugeError> {
        plaquette(&self.field, &self.exchange)
    }

    /// `n_therm` sweeps. Returns the global acceptance counters of these
    /// sweeps.
    pub fn thermalize(&mut self) -> Result<SweepStats, GaugeError> {
        let mut stats = SweepStats::default();
        for i in 0..self.cfg.n_therm {
            stats += self.sweep()?;
            if self.cfg.store_thermalization_observables {
                let p = self.plaquette()?;
                if self.is_root() {
                    info!("thermalization sweep {:>5}: plaquette {p:.12}", i + 1);
                }
            }
        }
        let total = stats.total(self.exchange.comm())?;
        if self.is_root() && self.cfg.n_therm > 0 {
            info!(
                "thermalization complete, acceptance rate {:.6}",
                total.acceptance_rate()
            );
        }
        Ok(total)
    }

    /// `n_cf` configurations, `n_cor` sweeps apart. Returns the plaquette of
    /// each and writes it out when `store_configurations` is set.
    pub fn sample(&mut self) -> Result<Vec<f64>, GaugeError> {
        let mut plaquettes = Vec::with_capacity(self.cfg.n_cf);
        for n in 0..self.cfg.n_cf {
            for _ in 0..self.cfg.n_cor {
                self.sweep()?;
            }
            let p = self.plaquette()?;
            if self.cfg.store_configurations {
                let path = io::configuration_path(&self.cfg, self.geometry.num_procs(), n);
                io::write_configuration_file(&path, &self.field, self.exchange.topology().grid_coord())?;
                self.exchange.comm().barrier()?;
                if self.is_root() {
                    info!("{} written", path.display());
                }
            }
            if self.is_root() {
                info!("configuration {n:>5}: plaquette {p:.12}");
            }
            plaquettes.push(p);
        }
        Ok(plaquettes)
    }

    /// Load each file into the field and measure its plaquette. Relative
    /// paths are taken from `input_folder`.
    pub fn load_and_measure(&mut self, files: &[PathBuf]) -> Result<Vec<f64>, GaugeError> {
        let order = match self.cfg.load_format {
            FileFormat::Native => ByteOrder::Little,
            FileFormat::Foreign => ByteOrder::Big,
        };
        let grid_coord = self.exchange.topology().grid_coord();
        let mut plaquettes = Vec::with_capacity(files.len());
        for file in files {
            let path = self.cfg.input_folder.join(file);
            io::read_configuration_file(&path, &mut self.field, grid_coord, order)?;
            debug!(
                "rank {}: loaded {}",
                self.exchange.comm().rank(),
                path.display()
            );
            let p = self.plaquette()?;
            if self.is_root() {
                info!("{}: plaquette {p:.12}", path.display());
            }
            plaquettes.push(p);
        }
        Ok(plaquettes)
    }

    /// Measure the configured input files if any, otherwise thermalize and
    /// sample.
    pub fn execute(&mut self) -> Result<RunSummary, GaugeError> {
        if !self.cfg.load_field_configs.is_empty() {
            let files = self.cfg.load_field_configs.clone();
            let plaquettes = self.load_and_measure(&files)?;
            return Ok(RunSummary {
                plaquettes,
                acceptance: SweepStats::default(),
            });
        }
        self.thermalize()?;
        let plaquettes = self.sample()?;
        let acceptance = self.updater.totals().total(self.exchange.comm())?;
        if self.is_root() {
            info!(
                "run complete: {} configurations, overall acceptance rate {:.6}",
                plaquettes.len(),
                acceptance.acceptance_rate()
            );
        }
        Ok(RunSummary {
            plaquettes,
            acceptance,
        })
    }
}
