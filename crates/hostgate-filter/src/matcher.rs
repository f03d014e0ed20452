//! Constraint matching.
//!
//! Decides whether one host satisfies one task constraint given the job's
//! current [`AttributeAggregate`]. Everything here is a pure function of its
//! inputs and may be called concurrently for many hosts sharing one
//! aggregate.

use std::collections::BTreeSet;

use tracing::debug;

use crate::aggregate::AttributeAggregate;
use crate::attribute::{Attribute, resolve_attribute};
use crate::constraint::{Constraint, ConstraintKind, TaskConstraint};
use crate::error::FilterResult;
use crate::veto::Veto;

/// Whether one more task may land on a host carrying `attribute`.
///
/// Satisfied iff every value of the attribute is held by fewer than
/// `max_count` of the job's active tasks. Checked per value, not summed: a
/// single value already at the cap is enough to refuse.
pub fn limit_satisfied(
    attribute: &Attribute,
    max_count: u32,
    aggregate: &AttributeAggregate,
) -> bool {
    let max_count = u64::from(max_count);
    attribute
        .values
        .iter()
        .all(|value| aggregate.count(&attribute.name, value) < max_count)
}

/// Veto (if any) for `constraint` on a host with `host_attributes`.
pub fn evaluate(
    aggregate: &AttributeAggregate,
    host_attributes: &[Attribute],
    constraint: &Constraint,
) -> Option<Veto> {
    let attribute = resolve_attribute(host_attributes, &constraint.name);

    let veto = match &constraint.kind {
        ConstraintKind::Value(value) => {
            let empty = BTreeSet::new();
            let host_values = attribute.as_ref().map_or(&empty, |a| &a.values);
            (!value.matches(host_values)).then(|| Veto::constraint_mismatch(&constraint.name))
        }
        ConstraintKind::Limit { max_count } => match &attribute {
            None => Some(Veto::constraint_mismatch(&constraint.name)),
            Some(attribute) => (!limit_satisfied(attribute, *max_count, aggregate))
                .then(|| Veto::limit_not_satisfied(&constraint.name)),
        },
    };

    if let Some(veto) = &veto {
        debug!(
            constraint = %constraint.name,
            kind = ?veto.kind,
            "constraint vetoed host"
        );
    }
    veto
}

/// Decode a wire constraint and evaluate it.
///
/// A constraint that cannot be decoded is an error, never a veto and never
/// "no veto".
pub fn evaluate_task_constraint(
    aggregate: &AttributeAggregate,
    host_attributes: &[Attribute],
    constraint: &TaskConstraint,
) -> FilterResult<Option<Veto>> {
    let constraint = Constraint::try_from(constraint)?;
    Ok(evaluate(aggregate, host_attributes, &constraint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ValueConstraint;
    use crate::error::FilterError;
    use crate::veto::VetoKind;

    fn value(name: &str, values: &[&str]) -> Constraint {
        Constraint::value(name, ValueConstraint::parse(name, values).unwrap())
    }

    #[test]
    fn limit_is_checked_per_value() {
        let attr = Attribute::new("rack", ["a", "b"]);
        let agg = AttributeAggregate::from_counts([("rack", "a", 1), ("rack", "b", 2)]);

        // Summed the counts would be 3; per value the worst is 2.
        assert!(limit_satisfied(&attr, 3, &agg));
        assert!(!limit_satisfied(&attr, 2, &agg));
    }

    #[test]
    fn zero_limit_is_always_violated() {
        let attr = Attribute::new("rack", ["a"]);
        assert!(!limit_satisfied(&attr, 0, &AttributeAggregate::empty()));
    }

    #[test]
    fn limit_on_attribute_without_values_is_satisfied() {
        let attr = Attribute::new("rack", Vec::<String>::new());
        assert!(limit_satisfied(&attr, 0, &AttributeAggregate::empty()));
    }

    #[test]
    fn value_mismatch_vetoes() {
        let host = vec![Attribute::new("zone", ["z1"])];
        let veto = evaluate(&AttributeAggregate::empty(), &host, &value("zone", &["z2"])).unwrap();
        assert_eq!(veto, Veto::constraint_mismatch("zone"));
    }

    #[test]
    fn missing_attribute_fails_limit_as_mismatch() {
        let host = vec![Attribute::new("zone", ["z1"])];
        let veto =
            evaluate(&AttributeAggregate::empty(), &host, &Constraint::limit("rack", 5)).unwrap();
        assert_eq!(veto.kind, VetoKind::ConstraintMismatch);
        assert_eq!(veto.reason, "Constraint not satisfied: rack");
    }

    #[test]
    fn limit_violation_vetoes() {
        let host = vec![Attribute::new("host", ["h1"])];
        let agg = AttributeAggregate::from_counts([("host", "h1", 1)]);
        let veto = evaluate(&agg, &host, &Constraint::limit("host", 1)).unwrap();
        assert_eq!(veto, Veto::limit_not_satisfied("host"));
    }

    #[test]
    fn split_attributes_are_merged_before_matching() {
        let host = vec![Attribute::new("rack", ["a"]), Attribute::new("rack", ["b"])];
        assert!(evaluate(&AttributeAggregate::empty(), &host, &value("rack", &["b"])).is_none());
        assert!(evaluate(&AttributeAggregate::empty(), &host, &value("rack", &["!b"])).is_some());
    }

    #[test]
    fn wire_constraint_errors_are_not_vetoes() {
        let bad = TaskConstraint::value("rack", ["!a", "b"]);
        let result = evaluate_task_constraint(&AttributeAggregate::empty(), &[], &bad);
        assert_eq!(result, Err(FilterError::MixedNegation("rack".to_string())));

        let good = TaskConstraint::value("rack", ["a"]);
        let result = evaluate_task_constraint(&AttributeAggregate::empty(), &[], &good);
        assert_eq!(result, Ok(Some(Veto::constraint_mismatch("rack"))));
    }
}
