use crate::error::ProtocolError;
use crate::ids::RolesetId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Reserved argument label for the verb's own surface form.
pub const REL_LABEL: &str = "Rel";

/// Which engine produced a roleset map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingMethod {
    Arguments,
    SentenceEmbedding,
    VerbEmbedding,
}

impl fmt::Display for GroupingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupingMethod::Arguments => "arguments",
            GroupingMethod::SentenceEmbedding => "sentence-embedding",
            GroupingMethod::VerbEmbedding => "verb-embedding",
        };
        f.write_str(name)
    }
}

/// Key used while grouping. Only a lookup aid: once a roleset is edited its
/// roles may no longer match the signature it was created under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Signature {
    /// Sorted role labels attached to the verb.
    Roles(Vec<String>),
    /// Synthetic label of an embedding cluster, e.g. `cluster-3`.
    Cluster(String),
    /// Roleset created by hand in the editing layer.
    Added(RolesetId),
}

impl Signature {
    pub fn cluster(ordinal: usize) -> Self {
        Signature::Cluster(format!("cluster-{}", ordinal))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Roles(roles) => write!(f, "({})", roles.join(", ")),
            Signature::Cluster(label) => f.write_str(label),
            Signature::Added(id) => write!(f, "added-{}", id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub sentence: String,
    /// Role label -> surface form realizing it.
    pub arguments: BTreeMap<String, String>,
}

impl Example {
    pub fn new(sentence: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_argument(mut self, label: impl Into<String>, form: impl Into<String>) -> Self {
        self.arguments.insert(label.into(), form.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roleset {
    pub id: RolesetId,
    pub signature: Signature,
    pub roles: Vec<String>,
    pub examples: Vec<Example>,
    /// Sentences routed here, including those not stored because of a cap.
    pub example_count: usize,
}

impl Roleset {
    pub fn new(id: RolesetId, signature: Signature, roles: Vec<String>) -> Self {
        Self {
            id,
            signature,
            roles,
            examples: Vec::new(),
            example_count: 0,
        }
    }
}

/// Ordered rolesets keyed by id, plus a signature index used while grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Snapshot", into = "Snapshot")]
pub struct RolesetMap {
    method: Option<GroupingMethod>,
    rolesets: Vec<Roleset>,
    index: HashMap<Signature, RolesetId>,
}

impl RolesetMap {
    pub fn new(method: GroupingMethod) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    pub fn method(&self) -> Option<GroupingMethod> {
        self.method
    }

    pub fn len(&self) -> usize {
        self.rolesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rolesets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Roleset> {
        self.rolesets.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = RolesetId> + '_ {
        self.rolesets.iter().map(|r| r.id)
    }

    pub fn get(&self, id: RolesetId) -> Option<&Roleset> {
        self.rolesets.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: RolesetId) -> Option<&mut Roleset> {
        self.rolesets.iter_mut().find(|r| r.id == id)
    }

    pub fn lookup(&self, signature: &Signature) -> Option<RolesetId> {
        self.index.get(signature).copied()
    }

    /// `max(existing ids) + 1`, or 1 for an empty map.
    pub fn next_id(&self) -> Result<RolesetId, ProtocolError> {
        match self.rolesets.iter().map(|r| r.id).max() {
            None => Ok(RolesetId::FIRST),
            Some(max) => max.checked_next().ok_or(ProtocolError::RolesetIdsExhausted(max)),
        }
    }

    /// Appends a new roleset under `signature` and returns its fresh id.
    /// If the signature is already indexed the existing id is returned untouched.
    pub fn insert(&mut self, signature: Signature, roles: Vec<String>) -> Result<RolesetId, ProtocolError> {
        if let Some(id) = self.lookup(&signature) {
            return Ok(id);
        }

        let id = self.next_id()?;
        self.index.insert(signature.clone(), id);
        self.rolesets.push(Roleset::new(id, signature, roles));
        Ok(id)
    }

    /// Editing layer: adds an empty roleset with no roles and no examples.
    ///
    /// Always a new roleset, even if a loaded snapshot already indexes
    /// `Added(id)` for the fresh id under some other roleset.
    pub fn create_empty_roleset(&mut self) -> Result<RolesetId, ProtocolError> {
        let id = self.next_id()?;
        let signature = Signature::Added(id);
        self.index.entry(signature.clone()).or_insert(id);
        self.rolesets.push(Roleset::new(id, signature, Vec::new()));
        Ok(id)
    }

    /// Editing layer: appends a hand-written example to an existing roleset.
    pub fn push_example(&mut self, id: RolesetId, example: Example) -> Result<(), ProtocolError> {
        let roleset = self.get_mut(id).ok_or(ProtocolError::UnknownRoleset(id))?;
        roleset.examples.push(example);
        roleset.example_count += 1;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    method: Option<GroupingMethod>,
    rolesets: Vec<Roleset>,
}

impl TryFrom<Snapshot> for RolesetMap {
    type Error = ProtocolError;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        let mut index = HashMap::with_capacity(snapshot.rolesets.len());
        let mut seen = Vec::with_capacity(snapshot.rolesets.len());

        for roleset in &snapshot.rolesets {
            if seen.contains(&roleset.id) {
                return Err(ProtocolError::DuplicateRolesetId(roleset.id));
            }
            seen.push(roleset.id);
            index.entry(roleset.signature.clone()).or_insert(roleset.id);
        }

        Ok(Self {
            method: snapshot.method,
            rolesets: snapshot.rolesets,
            index,
        })
    }
}

impl From<RolesetMap> for Snapshot {
    fn from(map: RolesetMap) -> Self {
        Self {
            method: map.method,
            rolesets: map.rolesets,
        }
    }
}
