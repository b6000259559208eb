//! Engine error types

use serde::{Deserialize, Serialize};

/// Errors reported by the engine.
///
/// None of these are fatal: a rejected transformation leaves the matrix
/// exactly as it was, and a rejected construction simply yields no matrix.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Malformed assignment syntax
    #[error("{0}")]
    Parse(String),

    /// Row reference outside `1..=size`
    #[error("Row R{index} is out of range (rows are R1..R{size})")]
    Range { index: usize, size: usize },

    /// Division by zero, non-vector result, non-finite values, bad shapes
    #[error("{0}")]
    Domain(String),

    /// Operator applied to operands it does not support
    #[error("{0}")]
    Type(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// The kind of an [`EngineError`], as reported to collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ParseError,
    RangeError,
    DomainError,
    TypeError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ParseError => write!(f, "ParseError"),
            ErrorKind::RangeError => write!(f, "RangeError"),
            ErrorKind::DomainError => write!(f, "DomainError"),
            ErrorKind::TypeError => write!(f, "TypeError"),
        }
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Parse(_) => ErrorKind::ParseError,
            EngineError::Range { .. } => ErrorKind::RangeError,
            EngineError::Domain(_) => ErrorKind::DomainError,
            EngineError::Type(_) => ErrorKind::TypeError,
        }
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        EngineError::Parse(message.into())
    }

    pub(crate) fn domain(message: impl Into<String>) -> Self {
        EngineError::Domain(message.into())
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        EngineError::Type(message.into())
    }
}
