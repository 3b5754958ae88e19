use framer_protocol::{Roleset, RolesetId, RolesetMap};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Edits made on top of a roleset map, keyed by roleset id and example index.
///
/// Removal is a flag, never a deletion: a removed roleset or example keeps its
/// data and can be restored. Only the renderer looks at these values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideStore {
    removed_rolesets: BTreeSet<RolesetId>,
    roles: BTreeMap<RolesetId, Vec<String>>,
    descriptions: BTreeMap<RolesetId, String>,
    removed_examples: BTreeMap<RolesetId, BTreeSet<usize>>,
    arguments: BTreeMap<RolesetId, BTreeMap<usize, Vec<(String, String)>>>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_roleset(&mut self, id: RolesetId) {
        self.removed_rolesets.insert(id);
    }

    pub fn restore_roleset(&mut self, id: RolesetId) {
        self.removed_rolesets.remove(&id);
    }

    pub fn is_roleset_removed(&self, id: RolesetId) -> bool {
        self.removed_rolesets.contains(&id)
    }

    pub fn set_roles(&mut self, id: RolesetId, roles: Vec<String>) {
        self.roles.insert(id, roles);
    }

    pub fn roles(&self, id: RolesetId) -> Option<&[String]> {
        self.roles.get(&id).map(Vec::as_slice)
    }

    pub fn set_description(&mut self, id: RolesetId, description: impl Into<String>) {
        self.descriptions.insert(id, description.into());
    }

    /// Empty when no description was attached.
    pub fn description(&self, id: RolesetId) -> &str {
        self.descriptions.get(&id).map_or("", String::as_str)
    }

    pub fn remove_example(&mut self, id: RolesetId, index: usize) {
        self.removed_examples.entry(id).or_default().insert(index);
    }

    pub fn restore_example(&mut self, id: RolesetId, index: usize) {
        if let Some(removed) = self.removed_examples.get_mut(&id) {
            removed.remove(&index);
            if removed.is_empty() {
                self.removed_examples.remove(&id);
            }
        }
    }

    pub fn is_example_removed(&self, id: RolesetId, index: usize) -> bool {
        self.removed_examples
            .get(&id)
            .map_or(false, |removed| removed.contains(&index))
    }

    pub fn set_arguments(&mut self, id: RolesetId, index: usize, arguments: Vec<(String, String)>) {
        self.arguments.entry(id).or_default().insert(index, arguments);
    }

    pub fn arguments(&self, id: RolesetId, index: usize) -> Option<&[(String, String)]> {
        self.arguments
            .get(&id)
            .and_then(|by_example| by_example.get(&index))
            .map(Vec::as_slice)
    }

    /// Rolesets not flagged as removed, in map order.
    pub fn active_rolesets<'a>(&'a self, map: &'a RolesetMap) -> impl Iterator<Item = &'a Roleset> + 'a {
        map.iter().filter(move |r| !self.is_roleset_removed(r.id))
    }

    /// Edited roles (trimmed, blanks dropped) if any were set, else the original ones.
    pub fn effective_roles(&self, roleset: &Roleset) -> Vec<String> {
        match self.roles(roleset.id) {
            Some(edited) => edited
                .iter()
                .map(|role| role.trim())
                .filter(|role| !role.is_empty())
                .map(str::to_string)
                .collect(),
            None => roleset.roles.clone(),
        }
    }
}
