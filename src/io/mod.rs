//! Configuration files.
//!
//! A configuration file holds the whole lattice in global site order. The
//! link leaving global site `g` in direction `mu` sits at byte offset
//! `(g · 4 + mu) · 144` as 18 doubles, real and imaginary parts interleaved,
//! row-major. Each process reads and writes only the byte ranges of its own
//! sites, so the file never passes through a single process.

pub mod field_io;

pub use field_io::{
    ByteOrder, decode_big_endian, read_configuration, read_configuration_file,
    write_configuration, write_configuration_file,
};

use crate::config::RunConfig;
use std::path::PathBuf;

/// `{batch}_b{beta}_N{ns}_NT{nt}_np{np}_config{n:05}.bin`, with `n` offset by
/// the configured start number.
pub fn configuration_file_name(cfg: &RunConfig, num_procs: usize, n: usize) -> String {
    format!(
        "{}_b{:.6}_N{}_NT{}_np{}_config{:05}.bin",
        cfg.batch_name,
        cfg.beta,
        cfg.n_spatial,
        cfg.n_temporal,
        num_procs,
        n + cfg.config_start_number
    )
}

/// Full path of sample `n` under [`RunConfig::configuration_dir`].
pub fn configuration_path(cfg: &RunConfig, num_procs: usize, n: usize) -> PathBuf {
    cfg.configuration_dir()
        .join(configuration_file_name(cfg, num_procs, n))
}
