//! Boundary-link exchange.
//!
//! [`LinkExchange`] answers "which link would sit at this coordinate if the
//! whole lattice lived in one process?" for coordinates one step (or one step
//! along each of two axes) outside the local sub-lattice.
//!
//! Every call is a lock-step collective: whether it communicates depends only
//! on the local coordinate, the local extents and the grid shape, which are
//! the same on every rank. So when one rank needs data from its neighbor at
//! step `k` of a traversal, that neighbor is at step `k` too and supplies the
//! mirror value in the same paired `sendrecv`.
//!
//! Ownership on the torus: the link wanted at `site + d` (with `d` crossing
//! the boundary) is held by rank `self + d` at the wrapped coordinate. Since
//! every rank runs the same call, each rank sends its own wrapped-coordinate
//! link to rank `self − d` and receives from `self + d`.

use crate::algs::communicator::{Communicator, LINK_TAG};
use crate::algs::wire::{WireLink, cast_slice, cast_slice_mut};
use crate::data::field::LatticeField;
use crate::data::su3::Su3;
use crate::gauge_error::GaugeError;
use crate::topology::process_grid::ProcessTopology;
use crate::topology::{Direction, Site};
use std::cell::Cell;

/// Resolves off-process links for one rank.
pub struct LinkExchange<'c, C: Communicator> {
    topology: ProcessTopology,
    comm: &'c C,
    messages: Cell<u64>,
}

impl<'c, C: Communicator> LinkExchange<'c, C> {
    /// # Errors
    /// `GaugeError::Configuration` if the communicator and topology disagree
    /// on rank or world size.
    pub fn new(topology: ProcessTopology, comm: &'c C) -> Result<Self, GaugeError> {
        if topology.rank() != comm.rank() || topology.num_procs() != comm.size() {
            return Err(GaugeError::Configuration(format!(
                "topology is for rank {}/{} but communicator is rank {}/{}",
                topology.rank(),
                topology.num_procs(),
                comm.rank(),
                comm.size()
            )));
        }
        Ok(Self {
            topology,
            comm,
            messages: Cell::new(0),
        })
    }

    pub fn topology(&self) -> &ProcessTopology {
        &self.topology
    }

    pub fn comm(&self) -> &'c C {
        self.comm
    }

    /// Paired exchanges issued so far by this rank.
    pub fn messages_sent(&self) -> u64 {
        self.messages.get()
    }

    /// Link `link_mu` at `site` shifted one step along `axis`.
    ///
    /// Local read when the step stays inside; otherwise exactly one paired
    /// exchange with the face neighbor (a local copy when that neighbor is
    /// this rank).
    pub fn fetch_across(
        &self,
        field: &LatticeField,
        site: Site,
        axis: usize,
        dir: Direction,
        link_mu: usize,
    ) -> Result<Su3, GaugeError> {
        let index = field.index();
        let target = index.shifted(site, axis, dir);
        if !index.crosses(site, axis, dir) || self.topology.is_self_neighbor(axis) {
            return Ok(*field.link(target, link_mu));
        }
        let source = self.topology.face_neighbor(axis, dir);
        let dest = self.topology.face_neighbor(axis, dir.opposite());
        self.exchange(field.link(target, link_mu), dest, source)
    }

    /// Link `link_mu` at `site` shifted one step along `axis_a` and one step
    /// along `axis_b` (`axis_a != axis_b`).
    ///
    /// Zero messages when neither step crosses, one face exchange when exactly
    /// one crosses, and one exchange addressed straight to the diagonal rank
    /// when both cross.
    #[allow(clippy::too_many_arguments)]
    pub fn fetch_diagonal(
        &self,
        field: &LatticeField,
        site: Site,
        axis_a: usize,
        dir_a: Direction,
        axis_b: usize,
        dir_b: Direction,
        link_mu: usize,
    ) -> Result<Su3, GaugeError> {
        debug_assert_ne!(axis_a, axis_b, "diagonal fetch needs two distinct axes");
        let index = field.index();
        let cross_a = index.crosses(site, axis_a, dir_a);
        let cross_b = index.crosses(site, axis_b, dir_b);
        match (cross_a, cross_b) {
            (false, false) => {
                let target = index.shifted(index.shifted(site, axis_a, dir_a), axis_b, dir_b);
                Ok(*field.link(target, link_mu))
            }
            (true, false) => {
                let inner = index.shifted(site, axis_b, dir_b);
                self.fetch_across(field, inner, axis_a, dir_a, link_mu)
            }
            (false, true) => {
                let inner = index.shifted(site, axis_a, dir_a);
                self.fetch_across(field, inner, axis_b, dir_b, link_mu)
            }
            (true, true) => {
                let corner = index.shifted(index.shifted(site, axis_a, dir_a), axis_b, dir_b);
                let source = self.topology.diagonal_neighbor(axis_a, dir_a, axis_b, dir_b);
                let dest = self.topology.diagonal_neighbor(
                    axis_a,
                    dir_a.opposite(),
                    axis_b,
                    dir_b.opposite(),
                );
                if source == self.topology.rank() {
                    return Ok(*field.link(corner, link_mu));
                }
                self.exchange(field.link(corner, link_mu), dest, source)
            }
        }
    }

    /// Send `mine` to `dest`, receive the link `source` sends in the same step.
    fn exchange(&self, mine: &Su3, dest: usize, source: usize) -> Result<Su3, GaugeError> {
        let out = [WireLink::of(mine)];
        let mut inbox = [WireLink::of(&Su3::ZERO)];
        self.comm
            .sendrecv(dest, source, LINK_TAG, cast_slice(&out), cast_slice_mut(&mut inbox))?;
        self.messages.set(self.messages.get() + 1);
        Ok(inbox[0].get())
    }
}
