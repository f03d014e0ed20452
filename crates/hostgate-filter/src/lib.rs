//! hostgate-filter — task placement eligibility.
//!
//! Decides whether a candidate host may run a task given the task's
//! placement constraints, and explains refusals as scored [`Veto`]s for
//! the ranking pipeline. The crate performs no I/O and holds no mutable
//! state; host attributes and the job's [`AttributeAggregate`] are
//! snapshots supplied by the caller once per scheduling round.
//!
//! # Components
//!
//! - **`attribute`** — host attributes and same-name merging
//! - **`aggregate`** — per-job `(attribute, value)` occurrence counts
//! - **`constraint`** — wire and parsed constraint forms, value matching
//! - **`matcher`** — limit matching and per-constraint evaluation
//! - **`veto`** — scored rejection reasons, maintenance vetoes
//! - **`filter`** — veto collection over one or many hosts

pub mod aggregate;
pub mod attribute;
pub mod constraint;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod veto;

pub use aggregate::{AggregateEntry, AttributeAggregate};
pub use attribute::{Attribute, resolve_attribute};
pub use constraint::{
    Constraint, ConstraintKind, NEGATION_MARKER, TaskConstraint, TaskConstraintKind,
    TaskLimitConstraint, TaskValueConstraint, ValueConstraint,
};
pub use error::{FilterError, FilterResult};
pub use filter::{Host, HostFilter, HostVerdict};
pub use matcher::{evaluate, evaluate_task_constraint, limit_satisfied};
pub use veto::{MAX_SCORE, MaintenanceMode, Veto, VetoKind, maintenance_veto};
