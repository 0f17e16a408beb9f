//! Schema Error Types

use thiserror::Error;

/// Errors when building vectors from raw values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Wrong number of values for the vector
    #[error("Expected {expected} values, got {actual}")]
    Arity { expected: usize, actual: usize },
}
