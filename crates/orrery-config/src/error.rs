//! Configuration error types.

use std::path::PathBuf;

/// Why a config file could not be loaded or stored.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file or directory could not be read.
    #[error("cannot read orrery config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file or its directory could not be written.
    #[error("cannot write orrery config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("invalid orrery config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// The in-memory config could not be turned into RON.
    #[error("cannot encode orrery config as RON: {0}")]
    Serialize(#[source] ron::Error),
}
