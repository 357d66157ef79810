//! Tool catalog and enabled tool groups.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Index;

/// Tool name → human-readable description.
pub type ToolGroup = BTreeMap<String, String>;

/// Tool group name → tools in that group, in the order the backend lists them.
/// Produced by the backend; read-only here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCatalog {
    groups: Vec<(String, ToolGroup)>,
}

impl ToolCatalog {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ToolGroup> {
        self.groups.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Group names in backend order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.groups.iter().map(|(n, _)| n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ToolGroup)> {
        self.groups.iter().map(|(n, g)| (n, g))
    }
}

impl FromIterator<(String, ToolGroup)> for ToolCatalog {
    fn from_iter<I: IntoIterator<Item = (String, ToolGroup)>>(iter: I) -> Self {
        let mut catalog = ToolCatalog::default();
        for (name, group) in iter {
            match catalog.groups.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = group,
                None => catalog.groups.push((name, group)),
            }
        }
        catalog
    }
}

impl Index<&str> for ToolCatalog {
    type Output = ToolGroup;

    fn index(&self, name: &str) -> &ToolGroup {
        match self.get(name) {
            Some(group) => group,
            None => panic!("no tool group named {:?}", name),
        }
    }
}

impl<'de> Deserialize<'de> for ToolCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // serde_json's map keeps insertion order, so groups come out as listed.
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(name, tools)| {
                serde_json::from_value::<ToolGroup>(tools)
                    .map(|group| (name.clone(), group))
                    .map_err(|e| D::Error::custom(format!("tool group '{}': {}", name, e)))
            })
            .collect()
    }
}

/// Set of enabled tool group names.
pub type EnabledToolGroups = BTreeSet<String>;

/// Default enablement when the backend has no record: every group in the catalog.
pub fn all_groups(catalog: &ToolCatalog) -> EnabledToolGroups {
    catalog.keys().cloned().collect()
}

/// Enabled set from the backend's list, or every group when there is no record.
/// Names the catalog does not know are kept; the backend decides what they mean.
pub fn enabled_or_default(catalog: &ToolCatalog, stored: Option<Vec<String>>) -> EnabledToolGroups {
    match stored {
        Some(names) => names.into_iter().collect(),
        None => all_groups(catalog),
    }
}

/// Split a group key like `"PKPM_Structural modeling"` into title and subtitle.
pub fn group_label(name: &str) -> (&str, Option<&str>) {
    match name.split_once('_') {
        Some((title, rest)) => (title, Some(rest.split('_').next().unwrap_or(rest))),
        None => (name, None),
    }
}

/// Drop repeated names, keeping the first occurrence.
pub fn dedup_names(names: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}
