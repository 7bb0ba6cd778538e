use lattice_metropolis::topology::index::{linear_index, site_of};
use lattice_metropolis::topology::{Index, LatticeGeometry, ProcessTopology, sites};
use proptest::prelude::*;

fn extents() -> impl Strategy<Value = [usize; 4]> {
    prop::array::uniform4(1usize..7)
}

proptest! {
    #[test]
    fn linear_index_round_trips(ext in extents(), seed in 0usize..10_000) {
        let volume: usize = ext.iter().product();
        let i = seed % volume;
        let site = site_of(i, ext);
        for axis in 0..4 {
            prop_assert!(site[axis] < ext[axis]);
        }
        prop_assert_eq!(linear_index(site, ext), i);
    }

    #[test]
    fn local_and_global_indices_are_bijections(
        local in prop::array::uniform4(3usize..5),
        grid in prop::array::uniform4(1usize..3),
    ) {
        let mut global = [0; 4];
        for a in 0..4 {
            global[a] = local[a] * grid[a];
        }
        let index = Index::new(local, global);
        for (i, s) in sites(local).enumerate() {
            prop_assert_eq!(index.local_index(s), i);
            prop_assert_eq!(index.local_site(i), s);
        }
        let g = index.global_index(global.map(|n| n - 1));
        prop_assert_eq!(g, index.global_volume() - 1);
        prop_assert_eq!(index.global_site(g), global.map(|n| n - 1));
    }

    /// The global sites owned by all ranks tile the lattice exactly once.
    #[test]
    fn decomposition_covers_every_global_site_once(
        local in prop::array::uniform4(3usize..5),
        grid in prop::array::uniform4(1usize..3),
    ) {
        let mut global = [0; 4];
        for a in 0..4 {
            global[a] = local[a] * grid[a];
        }
        let procs: usize = grid.iter().product();
        let geo = LatticeGeometry::new(global, procs, Some(grid)).unwrap();
        let index = geo.index();
        let mut seen = vec![0u8; geo.global_volume()];
        for rank in 0..procs {
            let topo = ProcessTopology::new(rank, procs, grid).unwrap();
            for s in sites(local) {
                seen[index.global_index(index.to_global(s, topo.grid_coord()))] += 1;
            }
        }
        prop_assert!(seen.iter().all(|&c| c == 1));
    }
}
