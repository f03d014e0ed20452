//! Ensemble configuration errors.

use thiserror::Error;

pub type EnsembleResult<T> = Result<T, EnsembleError>;

/// Errors raised while building or loading an ensemble configuration.
#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error("ensemble server list must not be empty")]
    EmptyServers,

    #[error("invalid server address {0:?}: expected host:port")]
    InvalidAddress(String),

    #[error("invalid chroot path {0:?}: must be absolute and not end with '/'")]
    InvalidChroot(String),

    #[error("invalid session timeout {0:?}")]
    InvalidTimeout(String),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
