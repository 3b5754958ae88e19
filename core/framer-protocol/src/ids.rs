use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a roleset. 1-based, never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct RolesetId(pub u32);

impl RolesetId {
    pub const FIRST: RolesetId = RolesetId(1);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Successor id, or `None` once `u32::MAX` is reached.
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }
}

impl From<u32> for RolesetId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<RolesetId> for u32 {
    fn from(id: RolesetId) -> u32 {
        id.0
    }
}

impl fmt::Display for RolesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
