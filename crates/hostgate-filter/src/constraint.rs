//! Task placement constraints.
//!
//! [`TaskConstraint`] is the form a constraint arrives in with a task
//! submission. It is converted once into a [`Constraint`], whose
//! [`ConstraintKind`] is a closed enum; everything downstream matches on it
//! exhaustively.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};

/// Prefix marking a value the host must NOT carry.
pub const NEGATION_MARKER: char = '!';

// ── Wire form ─────────────────────────────────────────────────────

/// A constraint as submitted with a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConstraint {
    pub name: String,
    pub constraint: TaskConstraintKind,
}

/// Union of constraint kinds. Exactly one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConstraintKind {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<TaskValueConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<TaskLimitConstraint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskValueConstraint {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLimitConstraint {
    pub limit: u32,
}

impl TaskConstraint {
    pub fn value<N, I, V>(name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            constraint: TaskConstraintKind {
                value: Some(TaskValueConstraint {
                    values: values.into_iter().map(Into::into).collect(),
                }),
                limit: None,
            },
        }
    }

    pub fn limit(name: impl Into<String>, limit: u32) -> Self {
        Self {
            name: name.into(),
            constraint: TaskConstraintKind {
                value: None,
                limit: Some(TaskLimitConstraint { limit }),
            },
        }
    }
}

// ── Parsed form ───────────────────────────────────────────────────

/// A validated constraint against one named host attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    Value(ValueConstraint),
    /// At most `max_count` of the job's tasks may share any one value of
    /// the attribute.
    Limit { max_count: u32 },
}

/// Value membership rule with the negation marker already stripped.
///
/// Not excluded: the host must carry at least one of the values.
/// Excluded: the host must carry none of them. Only [`ValueConstraint::parse`]
/// builds one, so the value set is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueConstraint {
    excluded: bool,
    values: BTreeSet<String>,
}

impl ValueConstraint {
    /// Parse raw values, where a leading `!` marks an excluded value.
    ///
    /// A set is either entirely negated or entirely positive; mixing the two
    /// is rejected rather than partially honored.
    pub fn parse<I, S>(name: &str, raw: I) -> FilterResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut negated = BTreeSet::new();
        let mut positive = BTreeSet::new();
        for value in raw {
            let value = value.as_ref();
            match value.strip_prefix(NEGATION_MARKER) {
                Some(stripped) => {
                    if stripped.is_empty() {
                        return Err(FilterError::EmptyValue(name.to_string()));
                    }
                    negated.insert(stripped.to_string());
                }
                None => {
                    if value.is_empty() {
                        return Err(FilterError::EmptyValue(name.to_string()));
                    }
                    positive.insert(value.to_string());
                }
            }
        }

        match (negated.is_empty(), positive.is_empty()) {
            (true, true) => Err(FilterError::EmptyValues(name.to_string())),
            (false, false) => Err(FilterError::MixedNegation(name.to_string())),
            (false, true) => Ok(Self {
                excluded: true,
                values: negated,
            }),
            (true, false) => Ok(Self {
                excluded: false,
                values: positive,
            }),
        }
    }

    pub fn excluded(&self) -> bool {
        self.excluded
    }

    /// Values with the negation marker stripped.
    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }

    /// Whether a host carrying `host_values` satisfies this rule. An empty
    /// set means the host lacks the attribute.
    pub fn matches(&self, host_values: &BTreeSet<String>) -> bool {
        let shared = self.values.iter().any(|v| host_values.contains(v));
        if self.excluded { !shared } else { shared }
    }
}

impl Constraint {
    pub fn value(name: impl Into<String>, value: ValueConstraint) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Value(value),
        }
    }

    pub fn limit(name: impl Into<String>, max_count: u32) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Limit { max_count },
        }
    }
}

impl TryFrom<&TaskConstraint> for Constraint {
    type Error = FilterError;

    fn try_from(task: &TaskConstraint) -> FilterResult<Self> {
        if task.name.is_empty() {
            return Err(FilterError::EmptyName);
        }

        let kind = match (&task.constraint.value, &task.constraint.limit) {
            (Some(value), None) => {
                ConstraintKind::Value(ValueConstraint::parse(&task.name, &value.values)?)
            }
            (None, Some(limit)) => ConstraintKind::Limit {
                max_count: limit.limit,
            },
            (None, None) => {
                return Err(FilterError::UnrecognizedConstraint {
                    name: task.name.clone(),
                    detail: "no constraint kind set".to_string(),
                });
            }
            (Some(_), Some(_)) => {
                return Err(FilterError::UnrecognizedConstraint {
                    name: task.name.clone(),
                    detail: "both value and limit set".to_string(),
                });
            }
        };

        Ok(Self {
            name: task.name.clone(),
            kind,
        })
    }
}

impl TryFrom<TaskConstraint> for Constraint {
    type Error = FilterError;

    fn try_from(task: TaskConstraint) -> FilterResult<Self> {
        Constraint::try_from(&task)
    }
}
