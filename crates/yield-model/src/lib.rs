//! Yield Regression Models
//!
//! A frozen regressor maps a normalized feature vector to a normalized yield
//! vector. Backends sit behind the [`YieldModel`] trait so the pipeline does
//! not care whether the weights came from a JSON export or an ONNX graph.

mod artifact;
mod dense;
mod linear;
mod onnx;

pub use artifact::{load_model, ModelArtifact};
pub use dense::{Activation, DenseLayer, DenseNetwork};
pub use linear::LinearModel;
pub use onnx::OnnxModel;

use thiserror::Error;

/// Errors during model loading or inference
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Model not loaded")]
    NotLoaded,
    #[error("Model load failed: {0}")]
    Load(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid {side} shape: expected {expected}, got {actual}")]
    DimensionMismatch {
        side: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// A previously trained regressor in normalized space
pub trait YieldModel: Send + Sync {
    /// Number of inputs the model expects
    fn input_dim(&self) -> usize;

    /// Number of outputs the model produces
    fn output_dim(&self) -> usize;

    /// Whether the artifact is available for inference
    fn is_loaded(&self) -> bool {
        true
    }

    /// Evaluate the model on one normalized feature vector
    fn predict(&self, input: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Fail unless a vector has `expected` entries
pub(crate) fn check_shape(
    side: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ModelError> {
    if expected != actual {
        return Err(ModelError::DimensionMismatch {
            side,
            expected,
            actual,
        });
    }
    Ok(())
}
