//! Wilson plaquette action.

use crate::action::GaugeAction;
use crate::algs::communicator::Communicator;
use crate::algs::exchange::LinkExchange;
use crate::data::field::LatticeField;
use crate::data::su3::Su3;
use crate::gauge_error::GaugeError;
use crate::topology::Direction::{Backward, Forward};
use crate::topology::{NDIM, Site};

/// `S = β Σ_P (1 − Re Tr P / 3)`.
#[derive(Clone, Debug)]
pub struct WilsonGaugeAction {
    beta: f64,
    /// `−β / 3`
    factor: f64,
    staple: Su3,
}

impl WilsonGaugeAction {
    pub fn new(beta: f64) -> Self {
        Self {
            beta,
            factor: -beta / 3.0,
            staple: Su3::ZERO,
        }
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl GaugeAction for WilsonGaugeAction {
    /// For every `nu != mu`:
    ///
    /// `U_nu(x+mu) U_mu(x+nu)† U_nu(x)† + U_nu(x+mu−nu)† U_mu(x−nu)† U_nu(x−nu)`
    ///
    /// Operands are fetched in a fixed order so that all ranks issue the same
    /// exchange sequence.
    fn compute_staple<C: Communicator>(
        &mut self,
        field: &LatticeField,
        exchange: &LinkExchange<'_, C>,
        site: Site,
        mu: usize,
    ) -> Result<Su3, GaugeError> {
        self.staple = Su3::ZERO;
        for nu in (0..NDIM).filter(|&nu| nu != mu) {
            let a = exchange.fetch_across(field, site, mu, Forward, nu)?;
            let b = exchange.fetch_across(field, site, nu, Forward, mu)?;
            let c = *field.link(site, nu);
            let d = exchange.fetch_diagonal(field, site, mu, Forward, nu, Backward, nu)?;
            let e = exchange.fetch_across(field, site, nu, Backward, mu)?;
            let f = exchange.fetch_across(field, site, nu, Backward, nu)?;
            self.staple += a * b.adjoint() * c.adjoint();
            self.staple += d.adjoint() * e.adjoint() * f;
        }
        Ok(self.staple)
    }

    fn delta_action(
        &self,
        field: &LatticeField,
        candidate: &Su3,
        site: Site,
        mu: usize,
        staple: &Su3,
    ) -> f64 {
        let diff = *candidate - *field.link(site, mu);
        diff.re_trace_product(staple) * self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;
    use crate::data::generator::{GroupElementGenerator, Su3Generator};
    use crate::topology::{LatticeGeometry, ProcessTopology};

    fn single(global: [usize; 4]) -> (LatticeGeometry, ProcessTopology) {
        let geo = LatticeGeometry::single(global).unwrap();
        let topo = ProcessTopology::new(0, 1, geo.grid).unwrap();
        (geo, topo)
    }

    #[test]
    fn cold_staple_is_six_identities() {
        let (geo, topo) = single([4, 4, 4, 4]);
        let field = LatticeField::cold(geo.index());
        let comm = NoComm;
        let ex = LinkExchange::new(topo, &comm).unwrap();
        let mut action = WilsonGaugeAction::new(6.0);
        let staple = action.compute_staple(&field, &ex, [1, 2, 3, 0], 2).unwrap();
        assert!(staple.max_abs_diff(&Su3::IDENTITY.scale(6.0)) < 1e-15);
        assert_eq!(ex.messages_sent(), 0);
    }

    #[test]
    fn delta_action_matches_plaquette_difference() {
        // On a cold field, replacing one link by X changes the six plaquettes
        // through it by Re Tr(X) − 3 each.
        let (geo, topo) = single([3, 3, 3, 3]);
        let field = LatticeField::cold(geo.index());
        let comm = NoComm;
        let ex = LinkExchange::new(topo, &comm).unwrap();
        let mut action = WilsonGaugeAction::new(5.5);
        let staple = action.compute_staple(&field, &ex, [0, 0, 0, 0], 1).unwrap();
        let mut g = Su3Generator::new(3, 0.2).unwrap();
        let x = g.near_identity();
        let ds = action.delta_action(&field, &x, [0, 0, 0, 0], 1, &staple);
        let expected = -5.5 / 3.0 * 6.0 * (x.re_trace() - 3.0);
        assert!((ds - expected).abs() < 1e-12, "{ds} vs {expected}");
        assert!(ds > 0.0);
    }

    #[test]
    fn identical_candidate_costs_nothing() {
        let (geo, topo) = single([3, 3, 3, 3]);
        let mut g = Su3Generator::new(8, 0.3).unwrap();
        let field = LatticeField::from_fn(geo.index(), |_, _| g.random_su3());
        let comm = NoComm;
        let ex = LinkExchange::new(topo, &comm).unwrap();
        let mut action = WilsonGaugeAction::new(6.0);
        let site = [2, 0, 1, 2];
        let staple = action.compute_staple(&field, &ex, site, 3).unwrap();
        let same = *field.link(site, 3);
        assert_eq!(action.delta_action(&field, &same, site, 3, &staple), 0.0);
    }
}
