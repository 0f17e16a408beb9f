//! Dense Feed-Forward Network
//!
//! Fully connected layers evaluated in order, `y = act(W x + b)`. Weight rows
//! are output units, so a layer with `n` inputs and `m` units has `m` rows of
//! length `n` (the transpose of a Keras `Dense` kernel).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{check_shape, ModelError, YieldModel};

/// Layer activation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Identity
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Elu,
    Softplus,
}

impl Activation {
    /// Apply the activation to one pre-activation value
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Elu => {
                if x > 0.0 {
                    x
                } else {
                    x.exp_m1()
                }
            }
            // ln(1 + e^x) without overflow for large x
            Activation::Softplus => x.max(0.0) + (-x.abs()).exp().ln_1p(),
        }
    }
}

/// One fully connected layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Weight matrix, one row per output unit
    pub weights: Vec<Vec<f64>>,
    /// Bias per output unit
    pub bias: Vec<f64>,
    /// Activation applied after the affine map
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    /// Create a layer, checking its shape
    pub fn new(
        weights: Vec<Vec<f64>>,
        bias: Vec<f64>,
        activation: Activation,
    ) -> Result<Self, ModelError> {
        let layer = Self {
            weights,
            bias,
            activation,
        };
        layer.validate()?;
        Ok(layer)
    }

    /// Number of inputs
    pub fn input_dim(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    /// Number of output units
    pub fn output_dim(&self) -> usize {
        self.weights.len()
    }

    fn validate(&self) -> Result<(), ModelError> {
        let inputs = self.input_dim();
        if self.weights.is_empty() || inputs == 0 {
            return Err(ModelError::Load("layer has an empty weight matrix".to_string()));
        }
        if let Some(row) = self.weights.iter().position(|r| r.len() != inputs) {
            return Err(ModelError::Load(format!(
                "weight row {} has {} entries, expected {}",
                row,
                self.weights[row].len(),
                inputs
            )));
        }
        if self.bias.len() != self.weights.len() {
            return Err(ModelError::Load(format!(
                "bias has {} entries, expected {}",
                self.bias.len(),
                self.weights.len()
            )));
        }
        let finite = self
            .weights
            .iter()
            .flatten()
            .chain(&self.bias)
            .all(|v| v.is_finite());
        if !finite {
            return Err(ModelError::Load("layer contains non-finite parameters".to_string()));
        }
        Ok(())
    }

    /// Evaluate the layer. The caller guarantees `input.len() == input_dim()`.
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let z = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b;
                self.activation.apply(z)
            })
            .collect()
    }
}

/// Feed-forward network of dense layers
#[derive(Debug, Clone, PartialEq)]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Create a network, checking that consecutive layers chain
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, ModelError> {
        if layers.is_empty() {
            return Err(ModelError::Load("network has no layers".to_string()));
        }
        for layer in &layers {
            layer.validate()?;
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_dim() != pair[1].input_dim() {
                return Err(ModelError::Load(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    pair[0].output_dim(),
                    i + 1,
                    pair[1].input_dim()
                )));
            }
        }

        let network = Self { layers };
        info!(
            "Built dense network: layers={}, inputs={}, outputs={}",
            network.layers.len(),
            network.input_dim(),
            network.output_dim()
        );
        Ok(network)
    }

    /// Layers in evaluation order
    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }
}

impl YieldModel for DenseNetwork {
    fn input_dim(&self) -> usize {
        self.layers[0].input_dim()
    }

    fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].output_dim()
    }

    fn predict(&self, input: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_shape("input", self.input_dim(), input.len())?;
        let mut activations = input.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        Ok(activations)
    }
}
