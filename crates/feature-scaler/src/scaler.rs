//! Feature Scaler
//!
//! Owns the feature transform (8-d) and the target transform (2-d). Each is
//! fitted exactly once, either from samples or from a loaded artifact, and is
//! read-only afterwards.

use std::path::Path;

use cultivation_schema::{FeatureVector, YieldVector, FEATURE_DIMENSION, TARGET_DIMENSION};
use tracing::info;

use crate::error::{ScalerError, ScalerSpace};
use crate::transform::{FittedTransform, ScalingMethod};

/// Paired feature/target scaler
#[derive(Debug, Clone, Default)]
pub struct FeatureScaler {
    /// Method used by `fit_*`
    method: ScalingMethod,
    /// Feature transform, once fitted
    features: Option<FittedTransform>,
    /// Target transform, once fitted
    targets: Option<FittedTransform>,
}

impl FeatureScaler {
    /// Create an unfitted scaler
    pub fn new(method: ScalingMethod) -> Self {
        Self {
            method,
            features: None,
            targets: None,
        }
    }

    /// Assemble a scaler from already fitted transforms
    pub fn from_transforms(
        features: FittedTransform,
        targets: FittedTransform,
    ) -> Result<Self, ScalerError> {
        features.validate(FEATURE_DIMENSION, ScalerSpace::Features)?;
        targets.validate(TARGET_DIMENSION, ScalerSpace::Targets)?;
        Ok(Self {
            method: features.method(),
            features: Some(features),
            targets: Some(targets),
        })
    }

    /// Load both transforms from their JSON artifacts
    pub fn from_json_files<P: AsRef<Path>, Q: AsRef<Path>>(
        features_path: P,
        targets_path: Q,
    ) -> Result<Self, ScalerError> {
        let features = FittedTransform::from_json_file(features_path)?;
        let targets = FittedTransform::from_json_file(targets_path)?;
        Self::from_transforms(features, targets)
    }

    /// Fit the feature transform from training samples
    pub fn fit_features(mut self, samples: &[FeatureVector]) -> Result<Self, ScalerError> {
        if self.features.is_some() {
            return Err(ScalerError::AlreadyFitted {
                space: ScalerSpace::Features,
            });
        }
        let rows: Vec<[f64; FEATURE_DIMENSION]> = samples.iter().map(FeatureVector::to_array).collect();
        self.features = Some(FittedTransform::fit(self.method, &rows, ScalerSpace::Features)?);
        Ok(self)
    }

    /// Fit the target transform from training samples
    pub fn fit_targets(mut self, samples: &[YieldVector]) -> Result<Self, ScalerError> {
        if self.targets.is_some() {
            return Err(ScalerError::AlreadyFitted {
                space: ScalerSpace::Targets,
            });
        }
        let rows: Vec<[f64; TARGET_DIMENSION]> = samples.iter().map(YieldVector::to_array).collect();
        self.targets = Some(FittedTransform::fit(self.method, &rows, ScalerSpace::Targets)?);
        Ok(self)
    }

    /// Whether both transforms are fitted
    pub fn is_fitted(&self) -> bool {
        self.features.is_some() && self.targets.is_some()
    }

    /// Fitted feature transform
    pub fn feature_transform(&self) -> Option<&FittedTransform> {
        self.features.as_ref()
    }

    /// Fitted target transform
    pub fn target_transform(&self) -> Option<&FittedTransform> {
        self.targets.as_ref()
    }

    /// Fail unless both transforms are fitted
    pub fn ensure_fitted(&self) -> Result<(), ScalerError> {
        self.fitted(ScalerSpace::Features)?;
        self.fitted(ScalerSpace::Targets)?;
        Ok(())
    }

    /// Raw features → normalized features
    pub fn transform_features(&self, values: &[f64]) -> Result<Vec<f64>, ScalerError> {
        self.fitted(ScalerSpace::Features)?
            .apply(values, ScalerSpace::Features)
    }

    /// Normalized features → raw features
    pub fn inverse_transform_features(&self, values: &[f64]) -> Result<Vec<f64>, ScalerError> {
        self.fitted(ScalerSpace::Features)?
            .invert(values, ScalerSpace::Features)
    }

    /// Raw yields → normalized yields
    pub fn transform_targets(&self, values: &[f64]) -> Result<Vec<f64>, ScalerError> {
        self.fitted(ScalerSpace::Targets)?
            .apply(values, ScalerSpace::Targets)
    }

    /// Normalized model output → yields in physical units
    pub fn inverse_transform_targets(&self, values: &[f64]) -> Result<Vec<f64>, ScalerError> {
        self.fitted(ScalerSpace::Targets)?
            .invert(values, ScalerSpace::Targets)
    }

    fn fitted(&self, space: ScalerSpace) -> Result<&FittedTransform, ScalerError> {
        let transform = match space {
            ScalerSpace::Features => self.features.as_ref(),
            ScalerSpace::Targets => self.targets.as_ref(),
        };
        transform.ok_or(ScalerError::NotFitted { space })
    }

    /// Write both transforms as JSON artifacts
    pub fn save_json_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        features_path: P,
        targets_path: Q,
    ) -> Result<(), ScalerError> {
        for (space, path) in [
            (ScalerSpace::Features, features_path.as_ref()),
            (ScalerSpace::Targets, targets_path.as_ref()),
        ] {
            let json = self.fitted(space)?.to_json()?;
            std::fs::write(path, json)
                .map_err(|e| ScalerError::Artifact(format!("{}: {}", path.display(), e)))?;
            info!("Saved {} scaler artifact to {}", space, path.display());
        }
        Ok(())
    }
}
