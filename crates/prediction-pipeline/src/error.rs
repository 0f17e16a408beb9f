//! Pipeline Error Types

use feature_scaler::ScalerError;
use thiserror::Error;
use yield_model::ModelError;

/// Errors during pipeline construction or prediction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Caller supplied a non-finite parameter
    #[error("Invalid input: {field} must be a finite number, got {value}")]
    InvalidInput { field: &'static str, value: f64 },

    /// Model artifact is not available
    #[error("Model not loaded")]
    ModelNotLoaded,

    /// Scaler and model disagree on a vector width
    #[error("{stage} dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Model produced NaN or infinity for a yield
    #[error("Model produced a non-finite {target}")]
    NonFiniteOutput { target: &'static str },

    #[error(transparent)]
    Scaler(#[from] ScalerError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl PipelineError {
    /// Whether the caller can fix the error by changing the input
    pub fn is_user_error(&self) -> bool {
        matches!(self, PipelineError::InvalidInput { .. })
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput { .. } => "invalid_input",
            PipelineError::ModelNotLoaded => "model_not_loaded",
            PipelineError::DimensionMismatch { .. } => "dimension_mismatch",
            PipelineError::NonFiniteOutput { .. } => "non_finite_output",
            PipelineError::Scaler(ScalerError::NotFitted { .. }) => "not_fitted",
            PipelineError::Scaler(_) => "scaler",
            PipelineError::Model(ModelError::NotLoaded) => "model_not_loaded",
            PipelineError::Model(_) => "model",
        }
    }
}
