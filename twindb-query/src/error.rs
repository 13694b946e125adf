//! Error types for query planning and parsing

use thiserror::Error;
use twindb_core::Iri;

/// Result type alias using QueryError
pub type Result<T> = std::result::Result<T, QueryError>;

/// Query planning errors
///
/// Execution itself is infallible: a query that plans successfully yields a
/// (possibly empty) binding sequence, never an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// A pattern references a predicate no registered property defines
    #[error("Unknown predicate: {0}")]
    UnknownPredicate(Iri),

    /// A projected variable is not bound by any pattern
    #[error("Variable {0} is not bound by any pattern")]
    VariableNotFound(String),

    /// Query text did not parse
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Query text parse error with byte offset into the source
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error at offset {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}
