//! Per-job attribute aggregate.
//!
//! Counts, for one job, how many of its active tasks sit on a host carrying
//! each `(attribute name, value)` pair. Limit constraints are checked against
//! these counts. The aggregate is a read-only snapshot for one scheduling
//! round; building it is the caller's job, [`AttributeAggregate::from_placements`]
//! is provided for the common case.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;

/// One serialized aggregate entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub name: String,
    pub value: String,
    pub count: u64,
}

/// Read-only `(name, value) -> count` summary of a job's placements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AggregateEntry>", into = "Vec<AggregateEntry>")]
pub struct AttributeAggregate {
    counts: HashMap<String, HashMap<String, u64>>,
}

impl AttributeAggregate {
    /// An aggregate for a job with no placed tasks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from explicit counts. Repeated keys are summed.
    pub fn from_counts<I, N, V>(counts: I) -> Self
    where
        I: IntoIterator<Item = (N, V, u64)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut aggregate = Self::default();
        for (name, value, count) in counts {
            aggregate.add(name.into(), value.into(), count);
        }
        aggregate
    }

    /// Build from the host attributes of each active task of the job.
    ///
    /// Each item is the attribute list of the host one task runs on. Every
    /// distinct value a task's host carries counts once for that task, even
    /// if the host reports the same attribute more than once.
    pub fn from_placements<'a, P, A>(placements: P) -> Self
    where
        P: IntoIterator<Item = A>,
        A: IntoIterator<Item = &'a Attribute>,
    {
        let mut aggregate = Self::default();
        for host_attributes in placements {
            let mut seen: HashSet<(&str, &str)> = HashSet::new();
            for attribute in host_attributes {
                for value in &attribute.values {
                    if seen.insert((attribute.name.as_str(), value.as_str())) {
                        aggregate.add(attribute.name.clone(), value.clone(), 1);
                    }
                }
            }
        }
        aggregate
    }

    fn add(&mut self, name: String, value: String, count: u64) {
        *self
            .counts
            .entry(name)
            .or_default()
            .entry(value)
            .or_insert(0) += count;
    }

    /// Number of active job tasks whose host carries `name = value`.
    pub fn count(&self, name: &str, value: &str) -> u64 {
        self.counts
            .get(name)
            .and_then(|values| values.get(value))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct `(name, value)` pairs.
    pub fn len(&self) -> usize {
        self.counts.values().map(HashMap::len).sum()
    }
}

impl From<Vec<AggregateEntry>> for AttributeAggregate {
    fn from(entries: Vec<AggregateEntry>) -> Self {
        Self::from_counts(entries.into_iter().map(|e| (e.name, e.value, e.count)))
    }
}

impl From<AttributeAggregate> for Vec<AggregateEntry> {
    fn from(aggregate: AttributeAggregate) -> Self {
        let mut entries: Vec<AggregateEntry> = aggregate
            .counts
            .into_iter()
            .flat_map(|(name, values)| {
                values.into_iter().map(move |(value, count)| AggregateEntry {
                    name: name.clone(),
                    value,
                    count,
                })
            })
            .collect();
        entries.sort_by(|a, b| (&a.name, &a.value).cmp(&(&b.name, &b.value)));
        entries
    }
}
