//! Linear Regression Model

use tracing::info;

use crate::dense::{Activation, DenseLayer};
use crate::{check_shape, ModelError, YieldModel};

/// Multi-output linear regressor, `y = W x + b`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    layer: DenseLayer,
}

impl LinearModel {
    /// Create a linear model from one weight row per output
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Result<Self, ModelError> {
        let layer = DenseLayer::new(weights, bias, Activation::Linear)?;
        info!(
            "Built linear model: inputs={}, outputs={}",
            layer.input_dim(),
            layer.output_dim()
        );
        Ok(Self { layer })
    }

    /// Model that passes the first `output_dim` inputs through unchanged
    pub fn projection(input_dim: usize, output_dim: usize) -> Result<Self, ModelError> {
        if output_dim > input_dim {
            return Err(ModelError::Load(format!(
                "cannot project {input_dim} inputs onto {output_dim} outputs"
            )));
        }
        let weights: Vec<Vec<f64>> = (0..output_dim)
            .map(|i| (0..input_dim).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        Self::new(weights, vec![0.0; output_dim])
    }

    /// Weight rows, one per output
    pub fn weights(&self) -> &[Vec<f64>] {
        &self.layer.weights
    }

    /// Intercepts, one per output
    pub fn bias(&self) -> &[f64] {
        &self.layer.bias
    }
}

impl YieldModel for LinearModel {
    fn input_dim(&self) -> usize {
        self.layer.input_dim()
    }

    fn output_dim(&self) -> usize {
        self.layer.output_dim()
    }

    fn predict(&self, input: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_shape("input", self.input_dim(), input.len())?;
        Ok(self.layer.forward(input))
    }
}
