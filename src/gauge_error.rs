//! GaugeError: unified error type for lattice-metropolis public APIs.
//!
//! Every error kind is fatal for a run. Library code only reports and
//! propagates; the binary decides how to tear the process group down.

use thiserror::Error;

/// Unified error type for lattice-metropolis operations.
#[derive(Debug, Error)]
pub enum GaugeError {
    /// Invalid extents, non-divisible decomposition or a too-thin sub-lattice.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Reading or writing a configuration file failed.
    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A configuration file decoded to non-finite values.
    #[error("Configuration file `{path}` is corrupt: {reason}")]
    CorruptConfiguration { path: String, reason: String },
    /// A run configuration could not be parsed.
    #[error("Failed to parse run configuration: {0}")]
    ConfigParse(String),
    /// A point-to-point exchange with `neighbor` failed.
    #[error("Transport error with rank {neighbor}: {source}")]
    Transport {
        neighbor: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A peer rank tore the communicator down.
    #[error("Communicator aborted by rank {rank} with code {code}")]
    Aborted { rank: usize, code: i32 },
}

impl GaugeError {
    /// `true` for the error kinds that originate in file handling.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::CorruptConfiguration { .. })
    }

    /// `true` for transport failures, including a collective abort.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Aborted { .. })
    }

    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for GaugeError {
    fn from(e: std::io::Error) -> Self {
        GaugeError::Io {
            path: String::from("<stream>"),
            source: e,
        }
    }
}

/// Simple error wrapper for transport failures that have no richer source.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CommError(pub String);
