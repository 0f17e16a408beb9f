//! ONNX Model Backend
//!
//! Runs an exported network through tract. The model is inert until
//! [`OnnxModel::load`] succeeds.

use std::path::{Path, PathBuf};

use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::{check_shape, ModelError, YieldModel};

type Plan = TypedRunnableModel<TypedModel>;

/// ONNX regressor with a `[1, input_dim] -> [1, output_dim]` signature
pub struct OnnxModel {
    /// Model path
    path: PathBuf,
    /// Expected input width
    input_dim: usize,
    /// Expected output width
    output_dim: usize,
    /// Optimized execution plan, once loaded
    plan: Option<Plan>,
}

impl OnnxModel {
    /// Create an unloaded ONNX model
    pub fn new<P: AsRef<Path>>(path: P, input_dim: usize, output_dim: usize) -> Self {
        let path = path.as_ref().to_path_buf();
        info!(
            "Creating ONNX model: path={}, inputs={}, outputs={}",
            path.display(),
            input_dim,
            output_dim
        );
        Self {
            path,
            input_dim,
            output_dim,
            plan: None,
        }
    }

    /// Create and load an ONNX model
    pub fn open<P: AsRef<Path>>(
        path: P,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<Self, ModelError> {
        let mut model = Self::new(path, input_dim, output_dim);
        model.load()?;
        Ok(model)
    }

    /// Parse, type and optimize the graph
    pub fn load(&mut self) -> Result<(), ModelError> {
        if self.plan.is_some() {
            debug!("ONNX model already loaded: {}", self.path.display());
            return Ok(());
        }

        let plan = tract_onnx::onnx()
            .model_for_path(&self.path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, self.input_dim]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ModelError::Load(format!("{}: {}", self.path.display(), e)))?;

        info!("ONNX model loaded: {}", self.path.display());
        self.plan = Some(plan);
        Ok(())
    }

    /// Model path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl YieldModel for OnnxModel {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn is_loaded(&self) -> bool {
        self.plan.is_some()
    }

    fn predict(&self, input: &[f64]) -> Result<Vec<f64>, ModelError> {
        let plan = self.plan.as_ref().ok_or(ModelError::NotLoaded)?;
        check_shape("input", self.input_dim, input.len())?;

        let data: Vec<f32> = input.iter().map(|&v| v as f32).collect();
        let array = tract_ndarray::Array2::from_shape_vec((1, self.input_dim), data)
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;

        let outputs = plan
            .run(tvec!(Tensor::from(array).into()))
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;
        let first = outputs
            .first()
            .ok_or_else(|| ModelError::InferenceFailed("model produced no outputs".to_string()))?;
        let view = first
            .to_array_view::<f32>()
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;

        let values: Vec<f64> = view.iter().map(|&v| f64::from(v)).collect();
        check_shape("output", self.output_dim, values.len())?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloaded_model_refuses_inference() {
        let model = OnnxModel::new("ann_model.onnx", 8, 2);
        assert!(!model.is_loaded());
        assert_eq!(model.predict(&[0.0; 8]), Err(ModelError::NotLoaded));
    }

    #[test]
    fn test_missing_file_fails_load() {
        let mut model = OnnxModel::new("/nonexistent/ann_model.onnx", 8, 2);
        match model.load() {
            Err(ModelError::Load(msg)) => assert!(msg.contains("/nonexistent/ann_model.onnx")),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(!model.is_loaded());
    }

    #[test]
    fn test_garbage_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.onnx");
        std::fs::write(&path, b"not a protobuf").unwrap();
        assert!(matches!(OnnxModel::open(&path, 8, 2), Err(ModelError::Load(_))));
    }
}
