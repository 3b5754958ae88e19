use framer_protocol::ProtocolError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GroupingError {
    #[error("similarity threshold {0} is outside [-1, 1]")]
    InvalidThreshold(f32),

    #[error("cosine similarity is undefined for a zero vector")]
    ZeroVector,

    #[error("vector dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("cosine similarity is not a finite number")]
    NonFinite,

    /// Provider failure. Terminal for the whole grouping call.
    #[error("embedding provider failed: {0}")]
    Embedding(String),

    /// Malformed input or an exhausted roleset id space.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl GroupingError {
    pub fn embedding(err: impl fmt::Display) -> Self {
        GroupingError::Embedding(err.to_string())
    }
}
