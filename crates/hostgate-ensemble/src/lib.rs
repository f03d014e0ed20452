//! hostgate-ensemble — coordination ensemble configuration.
//!
//! A validated value object describing how the scheduler reaches its
//! coordination ensemble: server addresses, an optional chroot, session
//! timeout and credentials. Leader election itself lives elsewhere; this
//! crate only validates and derives configurations.

pub mod config;
pub mod error;

pub use config::{Credentials, DEFAULT_SESSION_TIMEOUT, EnsembleConfig, ServerAddress};
pub use error::{EnsembleError, EnsembleResult};
