use crate::ids::RolesetId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("token '{token}' is missing required field '{field}'")]
    MissingField { field: &'static str, token: String },

    #[error("roleset {0} does not exist")]
    UnknownRoleset(RolesetId),

    #[error("roleset id {0} appears more than once in snapshot")]
    DuplicateRolesetId(RolesetId),

    #[error("no roleset id left after {0}")]
    RolesetIdsExhausted(RolesetId),
}
