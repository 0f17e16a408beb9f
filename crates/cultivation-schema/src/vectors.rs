//! Feature and Yield Vectors

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::parameter::{Parameter, Target};
use crate::{FEATURE_DIMENSION, TARGET_DIMENSION};

/// Raw cultivation conditions in physical units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Light intensity (µmol·m⁻²·s⁻¹)
    pub light_intensity: f64,
    /// Temperature (°C)
    pub temperature: f64,
    /// Hormone concentration (mol/L)
    pub hormone: f64,
    /// Bicarbonate (mmol/L)
    pub bicarbonate: f64,
    /// Nitrogen source (mmol/L)
    pub nitrogen_source: f64,
    /// Phosphorus source (mmol/L)
    pub phosphorus_source: f64,
    /// Cultivation time (days)
    pub cultivation_time: f64,
    /// Sodium chloride (mmol/L)
    pub nacl: f64,
}

impl Default for FeatureVector {
    fn default() -> Self {
        let mut values = [0.0; FEATURE_DIMENSION];
        for param in Parameter::ALL {
            values[param.index()] = param.default_value();
        }
        Self::from_array(values)
    }
}

impl FeatureVector {
    /// Create a feature vector, arguments in fitted order
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        light_intensity: f64,
        temperature: f64,
        hormone: f64,
        bicarbonate: f64,
        nitrogen_source: f64,
        phosphorus_source: f64,
        cultivation_time: f64,
        nacl: f64,
    ) -> Self {
        Self {
            light_intensity,
            temperature,
            hormone,
            bicarbonate,
            nitrogen_source,
            phosphorus_source,
            cultivation_time,
            nacl,
        }
    }

    /// Create a feature vector from values in fitted order
    pub fn from_array(values: [f64; FEATURE_DIMENSION]) -> Self {
        let [
            light_intensity,
            temperature,
            hormone,
            bicarbonate,
            nitrogen_source,
            phosphorus_source,
            cultivation_time,
            nacl,
        ] = values;
        Self {
            light_intensity,
            temperature,
            hormone,
            bicarbonate,
            nitrogen_source,
            phosphorus_source,
            cultivation_time,
            nacl,
        }
    }

    /// Create a feature vector from a slice, checking its arity
    pub fn try_from_slice(values: &[f64]) -> Result<Self, SchemaError> {
        let array: [f64; FEATURE_DIMENSION] =
            values.try_into().map_err(|_| SchemaError::Arity {
                expected: FEATURE_DIMENSION,
                actual: values.len(),
            })?;
        Ok(Self::from_array(array))
    }

    /// Values in fitted order
    pub fn to_array(&self) -> [f64; FEATURE_DIMENSION] {
        [
            self.light_intensity,
            self.temperature,
            self.hormone,
            self.bicarbonate,
            self.nitrogen_source,
            self.phosphorus_source,
            self.cultivation_time,
            self.nacl,
        ]
    }

    /// Value of a single parameter
    pub fn get(&self, param: Parameter) -> f64 {
        self.to_array()[param.index()]
    }

    /// Iterate over `(parameter, value)` pairs in fitted order
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f64)> {
        Parameter::ALL.into_iter().zip(self.to_array())
    }

    /// Parameters whose value lies outside the operator domain
    pub fn out_of_domain(&self) -> Vec<Parameter> {
        self.iter()
            .filter(|(param, value)| !param.in_domain(*value))
            .map(|(param, _)| param)
            .collect()
    }
}

/// Predicted yields in physical units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YieldVector {
    /// Dry weight (g/L)
    pub dry_weight: f64,
    /// Carotenoid yield (mg/L)
    pub carotenoid_yield: f64,
}

impl YieldVector {
    /// Create a yield vector
    pub fn new(dry_weight: f64, carotenoid_yield: f64) -> Self {
        Self {
            dry_weight,
            carotenoid_yield,
        }
    }

    /// Create a yield vector from values in model output order
    pub fn from_array(values: [f64; TARGET_DIMENSION]) -> Self {
        Self::new(values[0], values[1])
    }

    /// Create a yield vector from a slice, checking its arity
    pub fn try_from_slice(values: &[f64]) -> Result<Self, SchemaError> {
        let array: [f64; TARGET_DIMENSION] =
            values.try_into().map_err(|_| SchemaError::Arity {
                expected: TARGET_DIMENSION,
                actual: values.len(),
            })?;
        Ok(Self::from_array(array))
    }

    /// Values in model output order
    pub fn to_array(&self) -> [f64; TARGET_DIMENSION] {
        [self.dry_weight, self.carotenoid_yield]
    }

    /// Value of a single target
    pub fn get(&self, target: Target) -> f64 {
        self.to_array()[target.index()]
    }

    /// Elementwise `max(x, 0)`
    pub fn clamp_non_negative(&self) -> Self {
        Self::new(self.dry_weight.max(0.0), self.carotenoid_yield.max(0.0))
    }
}
