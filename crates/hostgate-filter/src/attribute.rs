//! Host attributes and per-name resolution.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A named, multi-valued label on a host (rack, zone, dedicated, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub values: BTreeSet<String>,
}

impl Attribute {
    pub fn new<N, I, V>(name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Merge every attribute named `name` into a single effective attribute.
///
/// Returns `None` when the host carries no attribute with that name. Value
/// sets are unioned, so the order of `attributes` never changes the result.
pub fn resolve_attribute<'a, I>(attributes: I, name: &str) -> Option<Attribute>
where
    I: IntoIterator<Item = &'a Attribute>,
{
    let mut found = false;
    let mut values = BTreeSet::new();
    for attribute in attributes.into_iter().filter(|a| a.name == name) {
        found = true;
        values.extend(attribute.values.iter().cloned());
    }

    found.then(|| Attribute {
        name: name.to_string(),
        values,
    })
}
