//! Process-local storage of link variables.

use crate::data::su3::Su3;
use crate::topology::index::Index;
use crate::topology::{NDIM, Site};

/// Contiguous store of `local_volume × 4` links, owned by one process.
///
/// Offset of the link leaving `site` in direction `mu` is
/// `local_index(site) × 4 + mu`.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeField {
    index: Index,
    links: Vec<Su3>,
}

impl LatticeField {
    /// Cold start: every link is the identity.
    pub fn cold(index: Index) -> Self {
        Self {
            links: vec![Su3::IDENTITY; index.local_volume() * NDIM],
            index,
        }
    }

    /// Fill every link from `f(site, mu)`, in storage order.
    pub fn from_fn(index: Index, mut f: impl FnMut(Site, usize) -> Su3) -> Self {
        let mut links = Vec::with_capacity(index.local_volume() * NDIM);
        for i in 0..index.local_volume() {
            let site = index.local_site(i);
            for mu in 0..NDIM {
                links.push(f(site, mu));
            }
        }
        Self { index, links }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    #[inline]
    pub fn offset(&self, site: Site, mu: usize) -> usize {
        self.index.local_index(site) * NDIM + mu
    }

    #[inline]
    pub fn link(&self, site: Site, mu: usize) -> &Su3 {
        &self.links[self.offset(site, mu)]
    }

    #[inline]
    pub fn set_link(&mut self, site: Site, mu: usize, u: Su3) {
        let o = self.offset(site, mu);
        self.links[o] = u;
    }

    pub fn links(&self) -> &[Su3] {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut [Su3] {
        &mut self.links
    }
}
