//! Filter error types.

use thiserror::Error;

/// Result type alias for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised when a task constraint cannot be evaluated at all.
///
/// These are schema errors, not scheduling outcomes: a host that fails a
/// constraint yields a [`Veto`](crate::Veto), never a `FilterError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("failed to recognize the constraint type for {name:?}: {detail}")]
    UnrecognizedConstraint { name: String, detail: String },

    #[error("constraint name must not be empty")]
    EmptyName,

    #[error("value constraint on {0:?} has no values")]
    EmptyValues(String),

    #[error("value constraint on {0:?} contains an empty value")]
    EmptyValue(String),

    #[error("value constraint on {0:?} mixes negated and non-negated values")]
    MixedNegation(String),
}
