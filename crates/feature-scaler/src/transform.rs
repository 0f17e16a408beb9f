//! Fitted Scaling Transforms

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ScalerError, ScalerSpace};

/// Relative spread below which a dimension counts as constant
const MIN_RELATIVE_SPREAD: f64 = 1e-12;

/// Scaling method used when fitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMethod {
    /// Zero mean, unit variance
    #[default]
    Standard,
    /// Min-max scaling to [0, 1]
    MinMax,
}

/// A fitted, invertible per-dimension affine transform.
///
/// Serialized with a `method` tag, so a standard transform reads
/// `{"method":"standard","mean":[...],"scale":[...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FittedTransform {
    /// `z = (x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `z = (x - data_min) / (data_max - data_min)`
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
    },
}

impl FittedTransform {
    /// Fit a transform from sample rows.
    ///
    /// Fails on an empty sample set, on non-finite values, and on any
    /// dimension without spread.
    pub fn fit<R: AsRef<[f64]>>(
        method: ScalingMethod,
        rows: &[R],
        space: ScalerSpace,
    ) -> Result<Self, ScalerError> {
        let invalid = |reason: String| ScalerError::InvalidTrainingData { space, reason };

        let first = rows
            .first()
            .ok_or_else(|| invalid("sample set is empty".to_string()))?;
        let dim = first.as_ref().len();
        if dim == 0 {
            return Err(invalid("samples have no dimensions".to_string()));
        }

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(ScalerError::DimensionMismatch {
                    space,
                    expected: dim,
                    actual: row.len(),
                });
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(invalid(format!("non-finite value in sample {i}, dimension {j}")));
            }
        }

        let n = rows.len() as f64;
        let transform = match method {
            ScalingMethod::Standard => {
                let mut mean = vec![0.0; dim];
                for row in rows {
                    for (m, &v) in mean.iter_mut().zip(row.as_ref()) {
                        *m += v;
                    }
                }
                mean.iter_mut().for_each(|m| *m /= n);

                // Population standard deviation, as the model's training
                // pipeline computed it
                let mut scale = vec![0.0; dim];
                for row in rows {
                    for ((s, &m), &v) in scale.iter_mut().zip(&mean).zip(row.as_ref()) {
                        let d = v - m;
                        *s += d * d;
                    }
                }
                scale.iter_mut().for_each(|s| *s = (*s / n).sqrt());

                for (j, (&s, &m)) in scale.iter().zip(&mean).enumerate() {
                    if s <= MIN_RELATIVE_SPREAD * m.abs().max(1.0) {
                        return Err(invalid(format!("dimension {j} has zero variance")));
                    }
                }

                FittedTransform::Standard { mean, scale }
            }
            ScalingMethod::MinMax => {
                let mut data_min = vec![f64::INFINITY; dim];
                let mut data_max = vec![f64::NEG_INFINITY; dim];
                for row in rows {
                    for (j, &v) in row.as_ref().iter().enumerate() {
                        data_min[j] = data_min[j].min(v);
                        data_max[j] = data_max[j].max(v);
                    }
                }

                for (j, (&lo, &hi)) in data_min.iter().zip(&data_max).enumerate() {
                    if hi - lo <= MIN_RELATIVE_SPREAD * lo.abs().max(1.0) {
                        return Err(invalid(format!("dimension {j} has zero range")));
                    }
                }

                FittedTransform::MinMax { data_min, data_max }
            }
        };
        transform.validate(dim, space)?;

        info!(
            "Fitted {} scaler: method={:?}, samples={}, dimensions={}",
            space,
            method,
            rows.len(),
            dim
        );
        Ok(transform)
    }

    /// Method this transform was fitted with
    pub fn method(&self) -> ScalingMethod {
        match self {
            FittedTransform::Standard { .. } => ScalingMethod::Standard,
            FittedTransform::MinMax { .. } => ScalingMethod::MinMax,
        }
    }

    /// Number of dimensions the transform was fitted on
    pub fn dimension(&self) -> usize {
        match self {
            FittedTransform::Standard { mean, .. } => mean.len(),
            FittedTransform::MinMax { data_min, .. } => data_min.len(),
        }
    }

    /// Check a loaded transform is usable for `expected` dimensions
    pub fn validate(&self, expected: usize, space: ScalerSpace) -> Result<(), ScalerError> {
        let (offset, spread): (&[f64], Vec<f64>) = match self {
            FittedTransform::Standard { mean, scale } => {
                check_len(space, expected, scale.len())?;
                (mean.as_slice(), scale.clone())
            }
            FittedTransform::MinMax { data_min, data_max } => {
                check_len(space, expected, data_max.len())?;
                let range = data_min.iter().zip(data_max).map(|(lo, hi)| hi - lo).collect();
                (data_min.as_slice(), range)
            }
        };
        check_len(space, expected, offset.len())?;

        for (j, (&o, &s)) in offset.iter().zip(&spread).enumerate() {
            if !o.is_finite() || !s.is_finite() || s <= 0.0 {
                return Err(ScalerError::InvalidTrainingData {
                    space,
                    reason: format!("dimension {j} has a degenerate scale"),
                });
            }
        }
        Ok(())
    }

    /// Map physical values into normalized space
    pub fn apply(&self, values: &[f64], space: ScalerSpace) -> Result<Vec<f64>, ScalerError> {
        check_len(space, self.dimension(), values.len())?;
        let out = match self {
            FittedTransform::Standard { mean, scale } => values
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(&x, (&m, &s))| (x - m) / s)
                .collect(),
            FittedTransform::MinMax { data_min, data_max } => values
                .iter()
                .zip(data_min.iter().zip(data_max))
                .map(|(&x, (&lo, &hi))| (x - lo) / (hi - lo))
                .collect(),
        };
        Ok(out)
    }

    /// Map normalized values back into physical units
    pub fn invert(&self, values: &[f64], space: ScalerSpace) -> Result<Vec<f64>, ScalerError> {
        check_len(space, self.dimension(), values.len())?;
        let out = match self {
            FittedTransform::Standard { mean, scale } => values
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(&z, (&m, &s))| z * s + m)
                .collect(),
            FittedTransform::MinMax { data_min, data_max } => values
                .iter()
                .zip(data_min.iter().zip(data_max))
                .map(|(&z, (&lo, &hi))| z * (hi - lo) + lo)
                .collect(),
        };
        Ok(out)
    }

    /// Parse a transform from its JSON artifact
    pub fn from_json_str(json: &str) -> Result<Self, ScalerError> {
        serde_json::from_str(json).map_err(|e| ScalerError::Artifact(e.to_string()))
    }

    /// Read a transform from a JSON artifact on disk
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ScalerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ScalerError::Artifact(format!("{}: {}", path.display(), e)))?;
        let transform: Self = serde_json::from_str(&json)
            .map_err(|e| ScalerError::Artifact(format!("{}: {}", path.display(), e)))?;
        info!(
            "Loaded scaler artifact {}: method={:?}, dimensions={}",
            path.display(),
            transform.method(),
            transform.dimension()
        );
        Ok(transform)
    }

    /// Serialize the transform as a JSON artifact
    pub fn to_json(&self) -> Result<String, ScalerError> {
        serde_json::to_string_pretty(self).map_err(|e| ScalerError::Artifact(e.to_string()))
    }
}

fn check_len(space: ScalerSpace, expected: usize, actual: usize) -> Result<(), ScalerError> {
    if expected != actual {
        return Err(ScalerError::DimensionMismatch {
            space,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPACE: ScalerSpace = ScalerSpace::Targets;

    #[test]
    fn test_standard_fit_matches_population_std() {
        let rows = [
            [2.0, 10.0],
            [4.0, 10.5],
            [4.0, 11.0],
            [4.0, 9.5],
            [5.0, 10.0],
            [5.0, 10.0],
            [7.0, 10.0],
            [9.0, 9.0],
        ];
        let t = FittedTransform::fit(ScalingMethod::Standard, &rows, SPACE).unwrap();
        match &t {
            FittedTransform::Standard { mean, scale } => {
                assert!((mean[0] - 5.0).abs() < 1e-12);
                assert!((scale[0] - 2.0).abs() < 1e-12);
            }
            other => panic!("unexpected transform {other:?}"),
        }

        let z = t.apply(&[7.0, 10.0], SPACE).unwrap();
        assert!((z[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_minmax_fit_maps_to_unit_interval() {
        let rows = [[0.0, -10.0], [50.0, 0.0], [100.0, 10.0]];
        let t = FittedTransform::fit(ScalingMethod::MinMax, &rows, SPACE).unwrap();
        let z = t.apply(&[50.0, 10.0], SPACE).unwrap();
        assert!((z[0] - 0.5).abs() < 1e-12);
        assert!((z[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_empty() {
        let rows: [[f64; 2]; 0] = [];
        let err = FittedTransform::fit(ScalingMethod::Standard, &rows, SPACE).unwrap_err();
        assert!(matches!(err, ScalerError::InvalidTrainingData { .. }));
    }

    #[test]
    fn test_fit_rejects_zero_variance() {
        let rows = [[0.1, 1.0], [0.1, 2.0], [0.1, 3.0]];
        for method in [ScalingMethod::Standard, ScalingMethod::MinMax] {
            let err = FittedTransform::fit(method, &rows, SPACE).unwrap_err();
            match err {
                ScalerError::InvalidTrainingData { reason, .. } => {
                    assert!(reason.contains("dimension 0"), "{reason}")
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_fit_rejects_overflowing_spread() {
        let rows = [[-1e308, 0.0], [1e308, 1.0]];
        for method in [ScalingMethod::Standard, ScalingMethod::MinMax] {
            let err = FittedTransform::fit(method, &rows, SPACE).unwrap_err();
            match err {
                ScalerError::InvalidTrainingData { reason, .. } => {
                    assert!(reason.contains("dimension 0"), "{reason}")
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_fit_rejects_non_finite_and_ragged() {
        let rows = [vec![1.0, 2.0], vec![f64::NAN, 3.0]];
        assert!(matches!(
            FittedTransform::fit(ScalingMethod::Standard, &rows, SPACE),
            Err(ScalerError::InvalidTrainingData { .. })
        ));

        let rows = [vec![1.0, 2.0], vec![3.0]];
        assert_eq!(
            FittedTransform::fit(ScalingMethod::Standard, &rows, SPACE),
            Err(ScalerError::DimensionMismatch {
                space: SPACE,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_validate_catches_degenerate_artifacts() {
        let t = FittedTransform::Standard {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 0.0],
        };
        assert!(matches!(
            t.validate(2, SPACE),
            Err(ScalerError::InvalidTrainingData { .. })
        ));

        let t = FittedTransform::MinMax {
            data_min: vec![0.0, 0.0],
            data_max: vec![1.0],
        };
        assert!(matches!(
            t.validate(2, SPACE),
            Err(ScalerError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_json_artifact_shape() {
        let json = r#"{"method":"standard","mean":[1.0,2.0],"scale":[0.5,4.0]}"#;
        let t = FittedTransform::from_json_str(json).unwrap();
        assert_eq!(t.method(), ScalingMethod::Standard);
        assert_eq!(t.invert(&[2.0, -0.5], SPACE).unwrap(), vec![2.0, 0.0]);

        let back = FittedTransform::from_json_str(&t.to_json().unwrap()).unwrap();
        assert_eq!(back, t);

        assert!(matches!(
            FittedTransform::from_json_str(r#"{"method":"robust"}"#),
            Err(ScalerError::Artifact(_))
        ));
    }
}
