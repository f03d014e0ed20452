//! Scored rejection reasons.
//!
//! A [`Veto`] says why a host cannot (or should preferably not) run a task.
//! A veto carrying [`MAX_SCORE`] alone makes the host infeasible; lower
//! scores only penalize the host when ranking.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Score reserved for categorical infeasibility.
pub const MAX_SCORE: u32 = 1000;

/// Which check produced a veto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VetoKind {
    ConstraintMismatch,
    LimitNotSatisfied,
    Maintenance,
}

/// A scored rejection reason. Pure value: equal fields are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Veto {
    pub kind: VetoKind,
    pub reason: String,
    pub score: u32,
}

impl Veto {
    /// The host's attribute does not satisfy a value constraint, or is
    /// missing entirely.
    pub fn constraint_mismatch(constraint: &str) -> Self {
        Self {
            kind: VetoKind::ConstraintMismatch,
            reason: format!("Constraint not satisfied: {constraint}"),
            score: MAX_SCORE,
        }
    }

    /// Placing the task would meet or exceed a per-job limit.
    pub fn limit_not_satisfied(constraint: &str) -> Self {
        Self {
            kind: VetoKind::LimitNotSatisfied,
            reason: format!("Limit not satisfied: {constraint}"),
            score: MAX_SCORE,
        }
    }

    /// The host is being taken out of service; `reason` is e.g. `"draining"`.
    pub fn maintenance(reason: &str) -> Self {
        Self {
            kind: VetoKind::Maintenance,
            reason: format!("Host {reason} for maintenance"),
            score: MAX_SCORE,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.score >= MAX_SCORE
    }
}

impl fmt::Display for Veto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (score {})", self.reason, self.score)
    }
}

/// Maintenance state of a host, as reported by the cluster layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceMode {
    #[default]
    None,
    /// Maintenance is planned; the host still accepts work.
    Scheduled,
    Draining,
    Drained,
}

impl MaintenanceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MaintenanceMode::None => "none",
            MaintenanceMode::Scheduled => "scheduled",
            MaintenanceMode::Draining => "draining",
            MaintenanceMode::Drained => "drained",
        }
    }
}

impl fmt::Display for MaintenanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Veto for a host in maintenance, if its mode excludes new tasks.
pub fn maintenance_veto(mode: MaintenanceMode) -> Option<Veto> {
    match mode {
        MaintenanceMode::None | MaintenanceMode::Scheduled => None,
        MaintenanceMode::Draining | MaintenanceMode::Drained => {
            Some(Veto::maintenance(mode.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_name_the_constraint() {
        assert_eq!(
            Veto::constraint_mismatch("rack").reason,
            "Constraint not satisfied: rack"
        );
        assert_eq!(Veto::limit_not_satisfied("host").reason, "Limit not satisfied: host");
        assert_eq!(Veto::maintenance("draining").reason, "Host draining for maintenance");
    }

    #[test]
    fn engine_vetoes_are_fatal() {
        assert!(Veto::constraint_mismatch("rack").is_fatal());
        assert!(Veto::limit_not_satisfied("rack").is_fatal());
        assert!(Veto::maintenance("drained").is_fatal());

        let soft = Veto {
            kind: VetoKind::ConstraintMismatch,
            reason: "soft".to_string(),
            score: 10,
        };
        assert!(!soft.is_fatal());
    }

    #[test]
    fn only_draining_and_drained_hosts_are_vetoed() {
        assert_eq!(maintenance_veto(MaintenanceMode::None), None);
        assert_eq!(maintenance_veto(MaintenanceMode::Scheduled), None);
        assert_eq!(
            maintenance_veto(MaintenanceMode::Draining),
            Some(Veto::maintenance("draining"))
        );
        assert_eq!(
            maintenance_veto(MaintenanceMode::Drained).map(|v| v.reason),
            Some("Host drained for maintenance".to_string())
        );
    }

    #[test]
    fn display_includes_score() {
        assert_eq!(
            Veto::limit_not_satisfied("rack").to_string(),
            "Limit not satisfied: rack (score 1000)"
        );
    }
}
