mod util;

use lattice_metropolis::action::WilsonGaugeAction;
use lattice_metropolis::algs::communicator::{Communicator, NoComm};
use lattice_metropolis::algs::exchange::LinkExchange;
use lattice_metropolis::algs::metropolis::{MetropolisUpdater, SweepStats};
use lattice_metropolis::config::{FileFormat, RunConfig};
use lattice_metropolis::data::field::LatticeField;
use lattice_metropolis::data::generator::Su3Generator;
use lattice_metropolis::io::configuration_file_name;
use lattice_metropolis::observables::plaquette;
use lattice_metropolis::run::Run;
use lattice_metropolis::topology::{LatticeGeometry, ProcessTopology};
use serial_test::serial;
use util::*;

// Recorded after one sweep of `cold_4x4_sweep`. Any change to the sweep
// order, the random streams or the action delta moves them.
const COLD_4X4_ACCEPTED: u64 = 2724;
const COLD_4X4_PLAQUETTE_BITS: u64 = 0x3fe9_4fa8_66ba_2088;

/// 4⁴, single process, cold start, beta 6, fixed seeds: one sweep.

fn cold_4x4_sweep() -> (SweepStats, f64, LatticeField) {
    let geo = LatticeGeometry::single([4, 4, 4, 4]).unwrap();
    let comm = NoComm;
    let ex = LinkExchange::new(ProcessTopology::new(0, 1, geo.grid).unwrap(), &comm).unwrap();
    let mut field = LatticeField::cold(geo.index());
    let mut updater = MetropolisUpdater::new(
        WilsonGaugeAction::new(6.0),
        Su3Generator::new(2024, 0.24).unwrap(),
        10,
        4048,
    );
    let stats = updater.sweep(&mut field, &ex).unwrap();
    let p = plaquette(&field, &ex).unwrap();
    (stats, p, field)
}

#[test]
fn cold_start_sweep_is_reproducible() {
    let (a_stats, a_plaq, a_field) = cold_4x4_sweep();
    let (b_stats, b_plaq, b_field) = cold_4x4_sweep();
    assert_eq!(a_stats, b_stats);
    assert_eq!(a_plaq.to_bits(), b_plaq.to_bits());
    assert_eq!(a_field, b_field);

    assert_eq!(a_stats.proposed, 256 * 4 * 10);
    assert!(a_stats.accepted > 0 && a_stats.accepted < a_stats.proposed);
    assert!(a_plaq < 1.0 && a_plaq > 0.5, "plaquette after one sweep: {a_plaq}");
}

#[test]
fn cold_start_sweep_matches_recorded_values() {
    let (stats, plaq, _) = cold_4x4_sweep();
    assert_eq!(stats.proposed, 10240);
    assert_eq!(stats.accepted, COLD_4X4_ACCEPTED);
    assert_eq!(
        plaq.to_bits(),
        COLD_4X4_PLAQUETTE_BITS,
        "plaquette {plaq:.17} (~0.79097385467413606)"
    );
}

fn config(json: &str) -> RunConfig {
    RunConfig::from_json(json).unwrap()
}

#[test]
fn distributed_runs_with_the_same_seed_agree() {
    let cfg = config(
        r#"{"beta": 5.7, "n_spatial": 6, "n_temporal": 6, "n_therm": 1, "n_cor": 1,
            "n_cf": 2, "n_updates": 3, "seed": 11, "start": "hot"}"#,
    );
    let first = spawn_world(2, |comm| Run::new(&cfg, &comm).unwrap().execute().unwrap());
    let second = spawn_world(2, |comm| Run::new(&cfg, &comm).unwrap().execute().unwrap());
    assert_eq!(first, second);
    assert_eq!(first[0], first[1], "every rank reports the global values");
    assert_eq!(first[0].plaquettes.len(), 2);
    assert_eq!(first[0].acceptance.proposed, (6u64.pow(4)) * 4 * 3 * 3);
}

#[test]
fn indivisible_lattice_fails_on_every_rank() {
    let cfg = config(r#"{"beta": 6.0, "n_spatial": 5, "n_temporal": 6}"#);
    let errors = spawn_world(2, |comm| Run::new(&cfg, &comm).err().map(|e| e.to_string()));
    for e in errors {
        assert!(e.is_some_and(|m| m.contains("not divisible") || m.contains("cannot halve")));
    }
}

#[test]
#[serial]
fn stored_configurations_measure_the_same_when_reloaded() {
    let out = std::env::temp_dir().join("lattice-metropolis-tests").join("run-output");
    let _ = std::fs::remove_dir_all(&out);
    let json = format!(
        r#"{{"batch_name": "store", "output_folder": {:?}, "beta": 6.0,
             "n_spatial": 6, "n_temporal": 6, "n_therm": 1, "n_cor": 1, "n_cf": 2,
             "n_updates": 2, "seed": 3, "store_configurations": true}}"#,
        out.display().to_string()
    );
    let cfg = config(&json);
    let sampled = spawn_world(2, |comm| Run::new(&cfg, &comm).unwrap().execute().unwrap());

    let mut reload = cfg.clone();
    reload.input_folder = cfg.configuration_dir();
    reload.load_format = FileFormat::Native;
    reload.load_field_configs = (0..2)
        .map(|n| configuration_file_name(&cfg, 2, n).into())
        .collect();
    // a single process reads the files written by two
    let comm = NoComm;
    let measured = Run::new(&reload, &comm).unwrap().execute().unwrap();
    for (a, b) in sampled[0].plaquettes.iter().zip(&measured.plaquettes) {
        assert!((a - b).abs() < 1e-12, "{a} vs {b}");
    }
    assert_eq!(comm.size(), 1);
    std::fs::remove_dir_all(&out).unwrap();
}
