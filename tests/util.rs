#![allow(dead_code)]
use lattice_metropolis::{
    algs::communicator::{Communicator, ThreadComm},
    algs::exchange::LinkExchange,
    data::field::LatticeField,
    data::generator::{GroupElementGenerator, Su3Generator},
    data::su3::Su3,
    topology::{Direction, LatticeGeometry, ProcessTopology, Site},
};

/// Run `f` once per rank of a `size`-rank thread world; results in rank order.
pub fn spawn_world<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(ThreadComm) -> T + Sync,
{
    let world = ThreadComm::world(size);
    std::thread::scope(|s| {
        let handles: Vec<_> = world
            .into_iter()
            .map(|comm| {
                let f = &f;
                s.spawn(move || f(comm))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}

/// The whole lattice in one field, links uniformly random.
pub fn reference_field(global: [usize; 4], seed: u64) -> LatticeField {
    let geo = LatticeGeometry::single(global).unwrap();
    let mut g = Su3Generator::new(seed, 0.3).unwrap();
    LatticeField::from_fn(geo.index(), |_, _| g.random_su3())
}

/// The block of `reference` that the process at `grid_coord` owns.
pub fn local_part(reference: &LatticeField, geo: &LatticeGeometry, grid_coord: [usize; 4]) -> LatticeField {
    let index = geo.index();
    LatticeField::from_fn(index, |site, mu| {
        *reference.link(index.to_global(site, grid_coord), mu)
    })
}

/// Periodic one-step shift on the global lattice.
pub fn global_shift(mut site: Site, global: [usize; 4], axis: usize, dir: Direction) -> Site {
    let n = global[axis];
    site[axis] = match dir {
        Direction::Forward => (site[axis] + 1) % n,
        Direction::Backward => (site[axis] + n - 1) % n,
    };
    site
}

/// Geometry, topology and local field for one rank of a decomposed reference.
pub fn setup_rank(
    reference: &LatticeField,
    grid: [usize; 4],
    comm: &ThreadComm,
) -> (LatticeGeometry, ProcessTopology, LatticeField) {
    let global = reference.index().global_extents();
    let geo = LatticeGeometry::new(global, comm.size(), Some(grid)).unwrap();
    let topo = ProcessTopology::new(comm.rank(), comm.size(), grid).unwrap();
    let field = local_part(reference, &geo, topo.grid_coord());
    (geo, topo, field)
}

pub fn exchange_for<'c>(topo: ProcessTopology, comm: &'c ThreadComm) -> LinkExchange<'c, ThreadComm> {
    LinkExchange::new(topo, comm).unwrap()
}

pub fn assert_links_eq(got: &Su3, want: &Su3, what: &str) {
    assert_eq!(got, want, "{what}");
}
