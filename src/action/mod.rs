//! Gauge actions.
//!
//! The Metropolis updater is written against [`GaugeAction`] only; the Wilson
//! plaquette action is the one implementation shipped.

pub mod wilson;

pub use wilson::WilsonGaugeAction;

use crate::algs::communicator::Communicator;
use crate::algs::exchange::LinkExchange;
use crate::data::field::LatticeField;
use crate::data::su3::Su3;
use crate::gauge_error::GaugeError;
use crate::topology::Site;

pub trait GaugeAction {
    /// Sum of the products of links that close the plaquettes around the link
    /// `(site, mu)`. May communicate, so every rank must call it for the same
    /// `(site, mu)` sequence.
    fn compute_staple<C: Communicator>(
        &mut self,
        field: &LatticeField,
        exchange: &LinkExchange<'_, C>,
        site: Site,
        mu: usize,
    ) -> Result<Su3, GaugeError>;

    /// Change of the action when the link `(site, mu)` is replaced by
    /// `candidate`, given the staple of that link.
    fn delta_action(
        &self,
        field: &LatticeField,
        candidate: &Su3,
        site: Site,
        mu: usize,
        staple: &Su3,
    ) -> f64;
}
