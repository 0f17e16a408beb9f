//! Prediction Pipeline Implementation

use std::sync::Arc;
use std::time::Instant;

use cultivation_schema::{FeatureVector, Target, YieldVector, FEATURE_DIMENSION, TARGET_DIMENSION};
use feature_scaler::FeatureScaler;
use metrics::{counter, histogram};
use tracing::{debug, info};
use yield_model::YieldModel;

use crate::error::PipelineError;
use crate::validator::InputValidator;

/// Composed, read-only yield predictor.
///
/// Holds a fitted scaler and a loaded model; every call is a pure function of
/// its input, so one pipeline can serve concurrent callers without locking.
pub struct PredictionPipeline {
    scaler: FeatureScaler,
    model: Arc<dyn YieldModel>,
}

impl PredictionPipeline {
    /// Wire a fitted scaler to a loaded model.
    ///
    /// Fails if either dependency is unusable; no partially working pipeline
    /// is ever returned.
    pub fn new(scaler: FeatureScaler, model: Arc<dyn YieldModel>) -> Result<Self, PipelineError> {
        scaler.ensure_fitted()?;
        if !model.is_loaded() {
            return Err(PipelineError::ModelNotLoaded);
        }
        if model.input_dim() != FEATURE_DIMENSION {
            return Err(PipelineError::DimensionMismatch {
                stage: "model input",
                expected: FEATURE_DIMENSION,
                actual: model.input_dim(),
            });
        }
        if model.output_dim() != TARGET_DIMENSION {
            return Err(PipelineError::DimensionMismatch {
                stage: "model output",
                expected: TARGET_DIMENSION,
                actual: model.output_dim(),
            });
        }

        info!(
            "Prediction pipeline ready: features={}, targets={}",
            FEATURE_DIMENSION, TARGET_DIMENSION
        );
        Ok(Self { scaler, model })
    }

    /// Predict yields for one set of cultivation conditions.
    ///
    /// Negative model estimates are clamped to zero; both returned yields are
    /// always non-negative.
    pub fn predict(&self, features: &FeatureVector) -> Result<YieldVector, PipelineError> {
        let start = Instant::now();
        let result = self.run(features);
        histogram!("yield_pipeline_predict_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(yields) => {
                counter!("yield_pipeline_predictions_total").increment(1);
                debug!(
                    "Prediction: dry_weight={:.4}, carotenoid_yield={:.4}",
                    yields.dry_weight, yields.carotenoid_yield
                );
            }
            Err(e) => {
                counter!("yield_pipeline_errors_total", "kind" => e.kind()).increment(1);
                debug!("Prediction failed: {}", e);
            }
        }
        result
    }

    fn run(&self, features: &FeatureVector) -> Result<YieldVector, PipelineError> {
        InputValidator::check_finite(features)?;
        for warning in InputValidator::check_domain(features) {
            debug!("{}", warning);
        }

        let normalized = self.scaler.transform_features(&features.to_array())?;
        let output = self.model.predict(&normalized)?;
        let denormalized = self.scaler.inverse_transform_targets(&output)?;
        let raw = YieldVector::try_from_slice(&denormalized).map_err(|_| {
            PipelineError::DimensionMismatch {
                stage: "target",
                expected: TARGET_DIMENSION,
                actual: denormalized.len(),
            }
        })?;

        for target in Target::ALL {
            let value = raw.get(target);
            if !value.is_finite() {
                return Err(PipelineError::NonFiniteOutput {
                    target: target.name(),
                });
            }
            if value < 0.0 {
                debug!("Clamping negative {} estimate {} to 0", target.name(), value);
                counter!("yield_pipeline_clamped_total", "target" => target.name()).increment(1);
            }
        }

        Ok(raw.clamp_non_negative())
    }
}
