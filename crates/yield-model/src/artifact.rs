//! Model Artifacts
//!
//! JSON exports of native models, plus the loader that picks a backend for a
//! model file.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dense::{DenseLayer, DenseNetwork};
use crate::linear::LinearModel;
use crate::onnx::OnnxModel;
use crate::{check_shape, ModelError, YieldModel};

/// Serialized native model, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Feed-forward network
    Dense { layers: Vec<DenseLayer> },
    /// Linear regressor
    Linear {
        weights: Vec<Vec<f64>>,
        bias: Vec<f64>,
    },
}

impl ModelArtifact {
    /// Parse an artifact from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        serde_json::from_str(json).map_err(|e| ModelError::Load(e.to_string()))
    }

    /// Read an artifact from disk
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Load(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&json)
            .map_err(|e| ModelError::Load(format!("{}: {}", path.display(), e)))
    }

    /// Serialize the artifact as JSON
    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::Load(e.to_string()))
    }

    /// Build the runtime model, validating its shape
    pub fn into_model(self) -> Result<Arc<dyn YieldModel>, ModelError> {
        let model: Arc<dyn YieldModel> = match self {
            ModelArtifact::Dense { layers } => Arc::new(DenseNetwork::new(layers)?),
            ModelArtifact::Linear { weights, bias } => Arc::new(LinearModel::new(weights, bias)?),
        };
        Ok(model)
    }
}

impl From<&DenseNetwork> for ModelArtifact {
    fn from(network: &DenseNetwork) -> Self {
        ModelArtifact::Dense {
            layers: network.layers().to_vec(),
        }
    }
}

impl From<&LinearModel> for ModelArtifact {
    fn from(model: &LinearModel) -> Self {
        ModelArtifact::Linear {
            weights: model.weights().to_vec(),
            bias: model.bias().to_vec(),
        }
    }
}

/// Load a model file, choosing the backend by extension.
///
/// `.onnx` files run through tract; anything else is read as a JSON
/// [`ModelArtifact`]. The loaded model must match the expected dimensions.
pub fn load_model<P: AsRef<Path>>(
    path: P,
    input_dim: usize,
    output_dim: usize,
) -> Result<Arc<dyn YieldModel>, ModelError> {
    let path = path.as_ref();
    let is_onnx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"));

    let model: Arc<dyn YieldModel> = if is_onnx {
        Arc::new(OnnxModel::open(path, input_dim, output_dim)?)
    } else {
        ModelArtifact::from_json_file(path)?.into_model()?
    };

    check_shape("input", input_dim, model.input_dim())?;
    check_shape("output", output_dim, model.output_dim())?;
    info!(
        "Loaded model {}: inputs={}, outputs={}",
        path.display(),
        model.input_dim(),
        model.output_dim()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DENSE_JSON: &str = r#"{
        "kind": "dense",
        "layers": [
            {"weights": [[1.0, 0.0], [0.0, 1.0]], "bias": [0.0, 0.0], "activation": "relu"},
            {"weights": [[1.0, 1.0]], "bias": [0.5]}
        ]
    }"#;

    #[test]
    fn test_parse_dense_artifact() {
        let model = ModelArtifact::from_json_str(DENSE_JSON)
            .unwrap()
            .into_model()
            .unwrap();
        assert_eq!(model.input_dim(), 2);
        assert_eq!(model.output_dim(), 1);
        assert_eq!(model.predict(&[2.0, -3.0]).unwrap(), vec![2.5]);
    }

    #[test]
    fn test_parse_linear_artifact() {
        let json = r#"{"kind": "linear", "weights": [[1.0, 2.0]], "bias": [3.0]}"#;
        let model = ModelArtifact::from_json_str(json).unwrap().into_model().unwrap();
        assert_eq!(model.predict(&[1.0, 1.0]).unwrap(), vec![6.0]);
    }

    #[test]
    fn test_malformed_artifacts_rejected() {
        assert!(matches!(
            ModelArtifact::from_json_str(r#"{"kind": "forest"}"#),
            Err(ModelError::Load(_))
        ));
        let ragged = r#"{"kind": "linear", "weights": [[1.0, 2.0], [1.0]], "bias": [0.0, 0.0]}"#;
        assert!(matches!(
            ModelArtifact::from_json_str(ragged).unwrap().into_model(),
            Err(ModelError::Load(_))
        ));
    }

    #[test]
    fn test_load_model_checks_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let artifact = ModelArtifact::from(&LinearModel::projection(8, 2).unwrap());
        std::fs::write(&path, artifact.to_json().unwrap()).unwrap();

        let model = load_model(&path, 8, 2).unwrap();
        assert_eq!(model.predict(&[1.0; 8]).unwrap(), vec![1.0, 1.0]);

        assert_eq!(
            load_model(&path, 8, 3).err(),
            Some(ModelError::DimensionMismatch {
                side: "output",
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_load_model_routes_onnx_by_extension() {
        let result = load_model("/nonexistent/ann_model.ONNX", 8, 2);
        match result {
            Err(ModelError::Load(msg)) => assert!(msg.contains("ann_model.ONNX")),
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("missing model loaded"),
        }
    }
}
