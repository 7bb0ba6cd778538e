//! Metropolis sweep over the local sub-lattice.
//!
//! Sites are visited in storage order (x, y, z, t) and, per site, directions
//! `mu = 0..4`. All ranks share that order, which keeps the staple exchanges
//! in lock-step.

use crate::action::GaugeAction;
use crate::algs::communicator::Communicator;
use crate::algs::exchange::LinkExchange;
use crate::data::field::LatticeField;
use crate::data::generator::GroupElementGenerator;
use crate::gauge_error::GaugeError;
use crate::topology::{NDIM, sites};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Acceptance counters of one or more sweeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub accepted: u64,
    pub proposed: u64,
}

impl SweepStats {
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposed == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposed as f64
        }
    }

    /// Sum of the counters over all ranks.
    pub fn total<C: Communicator>(&self, comm: &C) -> Result<SweepStats, GaugeError> {
        let mut v = [self.accepted as f64, self.proposed as f64];
        comm.all_reduce_sum(&mut v)?;
        Ok(SweepStats {
            accepted: v[0] as u64,
            proposed: v[1] as u64,
        })
    }
}

impl std::ops::AddAssign for SweepStats {
    fn add_assign(&mut self, rhs: Self) {
        self.accepted += rhs.accepted;
        self.proposed += rhs.proposed;
    }
}

pub struct MetropolisUpdater<A, G> {
    action: A,
    generator: G,
    uniform: SmallRng,
    n_updates: usize,
    totals: SweepStats,
}

impl<A: GaugeAction, G: GroupElementGenerator> MetropolisUpdater<A, G> {
    /// `n_updates` candidates are tried per link and sweep; `accept_seed`
    /// seeds the acceptance draws, independently of the generator.
    pub fn new(action: A, generator: G, n_updates: usize, accept_seed: u64) -> Self {
        Self {
            action,
            generator,
            uniform: SmallRng::seed_from_u64(accept_seed),
            n_updates,
            totals: SweepStats::default(),
        }
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn action_mut(&mut self) -> &mut A {
        &mut self.action
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    /// Counters accumulated over every sweep of this updater.
    pub fn totals(&self) -> SweepStats {
        self.totals
    }

    /// One sweep over every local link.
    ///
    /// The staple of a link is computed once and kept fixed while its
    /// candidates are tried; an accepted candidate overwrites the link before
    /// the next candidate is built from it.
    pub fn sweep<C: Communicator>(
        &mut self,
        field: &mut LatticeField,
        exchange: &LinkExchange<'_, C>,
    ) -> Result<SweepStats, GaugeError> {
        let mut stats = SweepStats::default();
        for site in sites(field.index().local_extents()) {
            for mu in 0..NDIM {
                let staple = self.action.compute_staple(field, exchange, site, mu)?;
                for _ in 0..self.n_updates {
                    let candidate = self.generator.near_identity() * *field.link(site, mu);
                    let ds = self.action.delta_action(field, &candidate, site, mu, &staple);
                    stats.proposed += 1;
                    if (-ds).exp() > self.uniform.r#gen::<f64>() {
                        field.set_link(site, mu, candidate);
                        stats.accepted += 1;
                    }
                }
            }
        }
        self.totals += stats;
        Ok(stats)
    }
}
