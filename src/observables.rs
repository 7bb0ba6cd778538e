//! Global observables over a distributed field, and the gauge transformation
//! used to check their invariance.
//!
//! Every function here is collective: all ranks must call it with fields of
//! the same geometry.

use crate::action::GaugeAction;
use crate::algs::communicator::Communicator;
use crate::algs::exchange::LinkExchange;
use crate::data::field::LatticeField;
use crate::gauge_error::GaugeError;
use crate::topology::Direction::Forward;
use crate::topology::{NDIM, sites};
use itertools::Itertools;

/// Local sum of `Re Tr P_{mu nu}(x)` over sites and planes `mu < nu`.
fn local_plaquette_sum<C: Communicator>(
    field: &LatticeField,
    exchange: &LinkExchange<'_, C>,
) -> Result<f64, GaugeError> {
    let mut sum = 0.0;
    for site in sites(field.index().local_extents()) {
        for (mu, nu) in (0..NDIM).tuple_combinations() {
            let u_nu_xmu = exchange.fetch_across(field, site, mu, Forward, nu)?;
            let u_mu_xnu = exchange.fetch_across(field, site, nu, Forward, mu)?;
            let p = *field.link(site, mu)
                * u_nu_xmu
                * u_mu_xnu.adjoint()
                * field.link(site, nu).adjoint();
            sum += p.re_trace();
        }
    }
    Ok(sum)
}

/// Average plaquette `Σ Re Tr P / (18 · V)`; 1 on a cold field.
pub fn plaquette<C: Communicator>(
    field: &LatticeField,
    exchange: &LinkExchange<'_, C>,
) -> Result<f64, GaugeError> {
    let mut v = [local_plaquette_sum(field, exchange)?];
    exchange.comm().all_reduce_sum(&mut v)?;
    Ok(v[0] / (18.0 * field.index().global_volume() as f64))
}

/// Total Wilson action `β Σ_P (1 − Re Tr P / 3)`.
pub fn wilson_action<C: Communicator>(
    field: &LatticeField,
    exchange: &LinkExchange<'_, C>,
    beta: f64,
) -> Result<f64, GaugeError> {
    let mut v = [local_plaquette_sum(field, exchange)?];
    exchange.comm().all_reduce_sum(&mut v)?;
    let planes = (NDIM * (NDIM - 1) / 2 * field.index().global_volume()) as f64;
    Ok(beta * (planes - v[0] / 3.0))
}

/// `Σ_{x,mu} Re Tr(U_mu(x) · staple_mu(x))`. Every plaquette enters four
/// times, once per link on its boundary.
pub fn staple_action_sum<C: Communicator, A: GaugeAction>(
    field: &LatticeField,
    exchange: &LinkExchange<'_, C>,
    action: &mut A,
) -> Result<f64, GaugeError> {
    let mut sum = 0.0;
    for site in sites(field.index().local_extents()) {
        for mu in 0..NDIM {
            let staple = action.compute_staple(field, exchange, site, mu)?;
            sum += field.link(site, mu).re_trace_product(&staple);
        }
    }
    let mut v = [sum];
    exchange.comm().all_reduce_sum(&mut v)?;
    Ok(v[0])
}

/// Apply `U_mu(n) → Ω(n) U_mu(n) Ω(n+mu)†` in place.
///
/// `omegas` carries `Ω(n)` in the `mu = 0` slot of every site and must share
/// the geometry of `field`.
pub fn gauge_transform<C: Communicator>(
    field: &mut LatticeField,
    omegas: &LatticeField,
    exchange: &LinkExchange<'_, C>,
) -> Result<(), GaugeError> {
    if omegas.index() != field.index() {
        return Err(GaugeError::Configuration(
            "gauge transformation and field have different geometries".into(),
        ));
    }
    for site in sites(field.index().local_extents()) {
        let here = *omegas.link(site, 0);
        for mu in 0..NDIM {
            let there = exchange.fetch_across(omegas, site, mu, Forward, 0)?;
            let u = here * *field.link(site, mu) * there.adjoint();
            field.set_link(site, mu, u);
        }
    }
    Ok(())
}
