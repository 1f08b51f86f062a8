//! Error types for flurry.
//!
//! The simulation itself never fails: bad timing is clamped and bad numbers
//! are the caller's problem. Only loading configuration can go wrong.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid RON for the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
