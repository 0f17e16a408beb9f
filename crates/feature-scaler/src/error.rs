//! Scaler Error Types

use std::fmt;
use thiserror::Error;

/// Which of the two transforms an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalerSpace {
    /// 8-dimensional cultivation parameters
    Features,
    /// 2-dimensional yields
    Targets,
}

impl fmt::Display for ScalerSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalerSpace::Features => write!(f, "feature"),
            ScalerSpace::Targets => write!(f, "target"),
        }
    }
}

/// Errors during fitting, loading or applying a scaler
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScalerError {
    /// Transform used before it was fitted
    #[error("{space} scaler is not fitted")]
    NotFitted { space: ScalerSpace },

    /// Transform fitted a second time
    #[error("{space} scaler is already fitted")]
    AlreadyFitted { space: ScalerSpace },

    /// Vector arity does not match the fitted transform
    #[error("{space} dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        space: ScalerSpace,
        expected: usize,
        actual: usize,
    },

    /// Training samples cannot produce a usable transform
    #[error("Invalid training data for {space} scaler: {reason}")]
    InvalidTrainingData { space: ScalerSpace, reason: String },

    /// Artifact could not be read or parsed
    #[error("Scaler artifact error: {0}")]
    Artifact(String),
}
