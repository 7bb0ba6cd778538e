use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use lattice_metropolis::action::WilsonGaugeAction;
use lattice_metropolis::algs::communicator::NoComm;
use lattice_metropolis::algs::exchange::LinkExchange;
use lattice_metropolis::algs::metropolis::MetropolisUpdater;
use lattice_metropolis::data::field::LatticeField;
use lattice_metropolis::data::generator::{GroupElementGenerator, Su3Generator};
use lattice_metropolis::observables::plaquette;
use lattice_metropolis::topology::{LatticeGeometry, ProcessTopology};

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("metropolis_sweep");
    group.sample_size(10);
    for &n in &[4usize, 6, 8] {
        let geo = LatticeGeometry::single([n; 4]).unwrap();
        let comm = NoComm;
        let ex = LinkExchange::new(ProcessTopology::new(0, 1, geo.grid).unwrap(), &comm).unwrap();
        let mut g = Su3Generator::new(1, 0.24).unwrap();
        let mut field = LatticeField::from_fn(geo.index(), |_, _| g.random_su3());
        let mut updater =
            MetropolisUpdater::new(WilsonGaugeAction::new(6.0), Su3Generator::new(2, 0.24).unwrap(), 10, 3);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| updater.sweep(&mut field, &ex).unwrap())
        });
    }
    group.finish();
}

fn bench_plaquette(c: &mut Criterion) {
    let geo = LatticeGeometry::single([8; 4]).unwrap();
    let comm = NoComm;
    let ex = LinkExchange::new(ProcessTopology::new(0, 1, geo.grid).unwrap(), &comm).unwrap();
    let mut g = Su3Generator::new(5, 0.24).unwrap();
    let field = LatticeField::from_fn(geo.index(), |_, _| g.random_su3());
    c.bench_function("plaquette_8x8x8x8", |b| b.iter(|| plaquette(&field, &ex).unwrap()));
}

criterion_group!(benches, bench_sweep, bench_plaquette);
criterion_main!(benches);
