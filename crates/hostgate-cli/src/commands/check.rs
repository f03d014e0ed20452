use std::path::Path;

use anyhow::Context;
use hostgate_filter::{AttributeAggregate, Host, HostFilter, HostVerdict, TaskConstraint};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A job's constraints and placement counts plus the hosts to test them on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub aggregate: AttributeAggregate,
    #[serde(default)]
    pub constraints: Vec<TaskConstraint>,
}

pub fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let scenario: Scenario = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    info!(
        scenario = %path.display(),
        hosts = scenario.hosts.len(),
        constraints = scenario.constraints.len(),
        "loaded scenario"
    );
    Ok(scenario)
}

pub fn evaluate(scenario: &Scenario) -> anyhow::Result<Vec<HostVerdict>> {
    let filter =
        HostFilter::from_task_constraints(scenario.aggregate.clone(), &scenario.constraints)?;
    Ok(filter.filter_hosts(&scenario.hosts))
}

pub fn format_verdicts(verdicts: &[HostVerdict]) -> String {
    let mut out = String::new();
    for verdict in verdicts {
        if verdict.is_eligible() {
            out.push_str(&format!("✓ {} eligible\n", verdict.host_id));
        } else {
            out.push_str(&format!("✗ {} vetoed\n", verdict.host_id));
            for veto in &verdict.vetoes {
                out.push_str(&format!("    {veto}\n"));
            }
        }
    }
    let eligible = verdicts.iter().filter(|v| v.is_eligible()).count();
    out.push_str(&format!("{eligible}/{} hosts eligible\n", verdicts.len()));
    out
}

pub fn check(path: &str, format: &str) -> anyhow::Result<()> {
    let scenario = load_scenario(Path::new(path))?;
    let verdicts = evaluate(&scenario)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&verdicts)?);
        }
        _ => {
            print!("{}", format_verdicts(&verdicts));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
[[hosts]]
id = "host-1"

[[hosts.attributes]]
name = "rack"
values = ["a"]

[[hosts]]
id = "host-2"

[[hosts.attributes]]
name = "rack"
values = ["b"]

[[hosts]]
id = "host-3"
maintenance = "draining"

[[hosts.attributes]]
name = "rack"
values = ["c"]

[[aggregate]]
name = "rack"
value = "a"
count = 3

[[constraints]]
name = "rack"
constraint = { limit = { limit = 3 } }

[[constraints]]
name = "rack"
constraint = { value = { values = ["!b"] } }
"#;

    #[test]
    fn toml_scenario_produces_verdicts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");
        std::fs::write(&path, SCENARIO).unwrap();

        let verdicts = evaluate(&load_scenario(&path).unwrap()).unwrap();

        assert_eq!(verdicts.len(), 3);
        assert_eq!(verdicts[0].vetoes[0].reason, "Limit not satisfied: rack");
        assert_eq!(verdicts[1].vetoes[0].reason, "Constraint not satisfied: rack");
        assert_eq!(verdicts[2].vetoes[0].reason, "Host draining for maintenance");
        assert_eq!(verdicts[2].vetoes.len(), 1);
    }

    #[test]
    fn json_scenario_is_detected_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        let json = r#"{
            "hosts": [{"id": "h1", "attributes": [{"name": "zone", "values": ["z1"]}]}],
            "constraints": [{"name": "zone", "constraint": {"value": {"values": ["z1"]}}}]
        }"#;
        std::fs::write(&path, json).unwrap();

        let verdicts = evaluate(&load_scenario(&path).unwrap()).unwrap();
        assert!(verdicts[0].is_eligible());
    }

    #[test]
    fn unrecognized_constraint_is_an_error() {
        let scenario: Scenario = serde_json::from_str(
            r#"{"hosts": [{"id": "h1"}], "constraints": [{"name": "zone", "constraint": {}}]}"#,
        )
        .unwrap();
        assert!(evaluate(&scenario).is_err());
    }

    #[test]
    fn text_output_lists_vetoes() {
        let scenario: Scenario = toml::from_str(SCENARIO).unwrap();
        let text = format_verdicts(&evaluate(&scenario).unwrap());

        assert!(text.contains("✗ host-1 vetoed"));
        assert!(text.contains("    Limit not satisfied: rack (score 1000)"));
        assert!(text.ends_with("0/3 hosts eligible\n"));
    }
}
