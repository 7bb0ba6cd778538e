//! Run configuration, loaded once from JSON and passed by reference to every
//! constructor.

use crate::gauge_error::GaugeError;
use crate::topology::NDIM;
use crate::topology::geometry::LatticeGeometry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the field is initialised before thermalization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartKind {
    /// Every link is the identity.
    #[default]
    Cold,
    /// Every link uniformly random in SU(3).
    Hot,
    /// Every link drawn near the identity.
    NearIdentity,
}

/// Byte order of configuration files read with `load_field_configs`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Files written by this program: little-endian doubles.
    #[default]
    Native,
    /// Big-endian doubles, the same site and link ordering.
    Foreign,
}

fn default_batch_name() -> String {
    "run".into()
}
fn default_output_folder() -> PathBuf {
    PathBuf::from("output")
}
fn default_input_folder() -> PathBuf {
    PathBuf::from("input")
}
fn default_n_updates() -> usize {
    10
}
fn default_su3_eps() -> f64 {
    0.24
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_batch_name")]
    pub batch_name: String,
    #[serde(default = "default_output_folder")]
    pub output_folder: PathBuf,
    #[serde(default = "default_input_folder")]
    pub input_folder: PathBuf,
    pub beta: f64,
    /// Spatial extent, shared by x, y and z.
    pub n_spatial: usize,
    /// Temporal extent.
    pub n_temporal: usize,
    #[serde(default)]
    pub n_therm: usize,
    #[serde(default)]
    pub n_cor: usize,
    #[serde(default)]
    pub n_cf: usize,
    /// Candidates tried per link and sweep.
    #[serde(default = "default_n_updates")]
    pub n_updates: usize,
    /// Spread of near-identity candidates, in `(0, 1)`.
    #[serde(default = "default_su3_eps")]
    pub su3_eps: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub start: StartKind,
    /// Explicit process grid; derived from the process count when absent.
    #[serde(default)]
    pub process_grid: Option<[usize; NDIM]>,
    #[serde(default)]
    pub store_configurations: bool,
    /// Added to the sample number in configuration file names.
    #[serde(default)]
    pub config_start_number: usize,
    /// Log the plaquette after every thermalization sweep.
    #[serde(default)]
    pub store_thermalization_observables: bool,
    /// When non-empty, these files are loaded and measured instead of
    /// generating new configurations.
    #[serde(default)]
    pub load_field_configs: Vec<PathBuf>,
    #[serde(default)]
    pub load_format: FileFormat,
}

impl RunConfig {
    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GaugeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GaugeError::io(path.display().to_string(), e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, GaugeError> {
        let cfg: RunConfig =
            serde_json::from_str(text).map_err(|e| GaugeError::ConfigParse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks that do not depend on the process count.
    pub fn validate(&self) -> Result<(), GaugeError> {
        if !(self.su3_eps > 0.0 && self.su3_eps < 1.0) {
            return Err(GaugeError::Configuration(format!(
                "su3_eps must lie in (0, 1), got {}",
                self.su3_eps
            )));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(GaugeError::Configuration(format!(
                "beta must be finite and non-negative, got {}",
                self.beta
            )));
        }
        if self.n_spatial == 0 || self.n_temporal == 0 {
            return Err(GaugeError::Configuration(
                "lattice extents must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn global_extents(&self) -> [usize; NDIM] {
        [self.n_spatial, self.n_spatial, self.n_spatial, self.n_temporal]
    }

    /// Validated decomposition of the lattice over `num_procs` processes.
    pub fn geometry(&self, num_procs: usize) -> Result<LatticeGeometry, GaugeError> {
        LatticeGeometry::new(self.global_extents(), num_procs, self.process_grid)
    }

    /// Directory that sampled configurations are written to.
    pub fn configuration_dir(&self) -> PathBuf {
        self.output_folder
            .join(&self.batch_name)
            .join("field_configurations")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_gets_defaults() {
        let cfg = RunConfig::from_json(r#"{"beta": 6.0, "n_spatial": 8, "n_temporal": 16}"#).unwrap();
        assert_eq!(cfg.n_updates, 10);
        assert_eq!(cfg.su3_eps, 0.24);
        assert_eq!(cfg.start, StartKind::Cold);
        assert_eq!(cfg.global_extents(), [8, 8, 8, 16]);
        assert_eq!(
            cfg.configuration_dir(),
            PathBuf::from("output/run/field_configurations")
        );
    }

    #[test]
    fn start_kind_is_snake_case() {
        let cfg = RunConfig::from_json(
            r#"{"beta": 6.0, "n_spatial": 4, "n_temporal": 4, "start": "near_identity",
                "process_grid": [2, 1, 1, 1]}"#,
        )
        .unwrap();
        assert_eq!(cfg.start, StartKind::NearIdentity);
        assert!(cfg.geometry(2).is_err());
        assert!(cfg.geometry(1).is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            RunConfig::from_json("{beta: 6}"),
            Err(GaugeError::ConfigParse(_))
        ));
    }

    #[test]
    fn out_of_range_spread_is_rejected() {
        assert!(matches!(
            RunConfig::from_json(r#"{"beta": 6.0, "n_spatial": 4, "n_temporal": 4, "su3_eps": 1.5}"#),
            Err(GaugeError::Configuration(_))
        ));
    }
}
