//! Per-host veto collection.
//!
//! A [`HostFilter`] captures one job's aggregate and constraints for a
//! scheduling round and turns each candidate host into a [`HostVerdict`]:
//! the maintenance veto, if any, followed by one veto per failing
//! constraint. Ranking feasible hosts is left to the caller.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::AttributeAggregate;
use crate::attribute::Attribute;
use crate::constraint::{Constraint, TaskConstraint};
use crate::error::FilterResult;
use crate::matcher::evaluate;
use crate::veto::{MaintenanceMode, Veto, maintenance_veto};

/// Snapshot of a candidate host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    #[serde(default)]
    pub maintenance: MaintenanceMode,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// Outcome of filtering one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostVerdict {
    pub host_id: String,
    pub vetoes: Vec<Veto>,
}

impl HostVerdict {
    pub fn is_eligible(&self) -> bool {
        self.vetoes.is_empty()
    }

    /// Sum of veto scores, saturating.
    pub fn total_score(&self) -> u32 {
        self.vetoes.iter().fold(0u32, |acc, v| acc.saturating_add(v.score))
    }
}

/// One job's constraints and placement aggregate for a scheduling round.
#[derive(Debug, Clone)]
pub struct HostFilter {
    aggregate: AttributeAggregate,
    constraints: Vec<Constraint>,
}

impl HostFilter {
    pub fn new(aggregate: AttributeAggregate, constraints: Vec<Constraint>) -> Self {
        Self {
            aggregate,
            constraints,
        }
    }

    /// Decode wire constraints, failing on the first one that cannot be
    /// decoded.
    pub fn from_task_constraints(
        aggregate: AttributeAggregate,
        constraints: &[TaskConstraint],
    ) -> FilterResult<Self> {
        let constraints = constraints
            .iter()
            .map(|task| {
                Constraint::try_from(task).inspect_err(|e| {
                    warn!(constraint = %task.name, error = %e, "rejected task constraint");
                })
            })
            .collect::<FilterResult<Vec<_>>>()?;
        Ok(Self::new(aggregate, constraints))
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn aggregate(&self) -> &AttributeAggregate {
        &self.aggregate
    }

    /// All vetoes for `host`, maintenance first, then constraints in
    /// declaration order.
    pub fn vetoes(&self, host: &Host) -> Vec<Veto> {
        let vetoes: Vec<Veto> = maintenance_veto(host.maintenance)
            .into_iter()
            .chain(
                self.constraints
                    .iter()
                    .filter_map(|c| evaluate(&self.aggregate, &host.attributes, c)),
            )
            .collect();

        debug!(host = %host.id, vetoes = vetoes.len(), "filtered host");
        vetoes
    }

    pub fn is_eligible(&self, host: &Host) -> bool {
        self.vetoes(host).is_empty()
    }

    pub fn verdict(&self, host: &Host) -> HostVerdict {
        HostVerdict {
            host_id: host.id.clone(),
            vetoes: self.vetoes(host),
        }
    }

    /// Filter many hosts on the rayon pool. Verdicts come back in the order
    /// of `hosts`.
    pub fn filter_hosts(&self, hosts: &[Host]) -> Vec<HostVerdict> {
        let verdicts: Vec<HostVerdict> = hosts.par_iter().map(|h| self.verdict(h)).collect();

        let eligible = verdicts.iter().filter(|v| v.is_eligible()).count();
        info!(
            hosts = hosts.len(),
            eligible,
            constraints = self.constraints.len(),
            "filtered candidate hosts"
        );
        verdicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::veto::VetoKind;

    fn host(id: &str, rack: &str) -> Host {
        Host {
            id: id.to_string(),
            maintenance: MaintenanceMode::None,
            attributes: vec![
                Attribute::new("rack", [rack]),
                Attribute::new("host", [id]),
            ],
        }
    }

    fn job_filter() -> HostFilter {
        let agg = AttributeAggregate::from_counts([("rack", "r1", 2), ("host", "h1", 1)]);
        HostFilter::from_task_constraints(
            agg,
            &[TaskConstraint::limit("host", 1), TaskConstraint::limit("rack", 2)],
        )
        .unwrap()
    }

    #[test]
    fn eligible_host_has_no_vetoes() {
        let filter = job_filter();
        assert!(filter.is_eligible(&host("h2", "r2")));
    }

    #[test]
    fn vetoes_follow_declaration_order() {
        let filter = job_filter();
        let vetoes = filter.vetoes(&host("h1", "r1"));
        assert_eq!(
            vetoes,
            vec![Veto::limit_not_satisfied("host"), Veto::limit_not_satisfied("rack")]
        );
    }

    #[test]
    fn maintenance_veto_comes_first() {
        let filter = job_filter();
        let mut draining = host("h1", "r2");
        draining.maintenance = MaintenanceMode::Draining;

        let verdict = filter.verdict(&draining);
        assert_eq!(verdict.vetoes.len(), 2);
        assert_eq!(verdict.vetoes[0].kind, VetoKind::Maintenance);
        assert_eq!(verdict.vetoes[1], Veto::limit_not_satisfied("host"));
        assert_eq!(verdict.total_score(), 2000);
    }

    #[test]
    fn scheduled_maintenance_does_not_veto() {
        let filter = job_filter();
        let mut scheduled = host("h3", "r3");
        scheduled.maintenance = MaintenanceMode::Scheduled;
        assert!(filter.is_eligible(&scheduled));
    }

    #[test]
    fn undecodable_constraint_fails_construction() {
        let result = HostFilter::from_task_constraints(
            AttributeAggregate::empty(),
            &[TaskConstraint::limit("host", 1), TaskConstraint::value("rack", ["!a", "b"])],
        );
        assert!(result.is_err());
    }

    #[test]
    fn filter_hosts_preserves_input_order() {
        let filter = job_filter();
        let hosts: Vec<Host> = (0..50)
            .map(|i| host(&format!("h{i}"), if i % 2 == 0 { "r1" } else { "r2" }))
            .collect();

        let verdicts = filter.filter_hosts(&hosts);

        assert_eq!(verdicts.len(), hosts.len());
        for (verdict, host) in verdicts.iter().zip(&hosts) {
            assert_eq!(verdict.host_id, host.id);
            assert_eq!(verdict, &filter.verdict(host));
        }
        // h1 is on r2 but already hosts a task; every r1 host is at the rack cap.
        assert!(!verdicts[1].is_eligible());
        assert!(!verdicts[0].is_eligible());
        assert!(verdicts[3].is_eligible());
    }

    #[test]
    fn filter_hosts_handles_empty_input() {
        assert!(job_filter().filter_hosts(&[]).is_empty());
    }
}
