//! Parameter and Target Metadata

use serde::{Deserialize, Serialize};

use crate::FEATURE_DIMENSION;

/// Cultivation parameter, in the order the scaler and model were fitted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// Light intensity (µmol·m⁻²·s⁻¹)
    LightIntensity,
    /// Temperature (°C)
    Temperature,
    /// Hormone concentration (mol/L)
    Hormone,
    /// Bicarbonate (mmol/L)
    Bicarbonate,
    /// Nitrogen source (mmol/L)
    NitrogenSource,
    /// Phosphorus source (mmol/L)
    PhosphorusSource,
    /// Cultivation time (days)
    CultivationTime,
    /// Sodium chloride (mmol/L)
    Nacl,
}

impl Parameter {
    /// All parameters in fitted order
    pub const ALL: [Parameter; FEATURE_DIMENSION] = [
        Parameter::LightIntensity,
        Parameter::Temperature,
        Parameter::Hormone,
        Parameter::Bicarbonate,
        Parameter::NitrogenSource,
        Parameter::PhosphorusSource,
        Parameter::CultivationTime,
        Parameter::Nacl,
    ];

    /// Position in the feature vector
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::LightIntensity => "light_intensity",
            Parameter::Temperature => "temperature",
            Parameter::Hormone => "hormone",
            Parameter::Bicarbonate => "bicarbonate",
            Parameter::NitrogenSource => "nitrogen_source",
            Parameter::PhosphorusSource => "phosphorus_source",
            Parameter::CultivationTime => "cultivation_time",
            Parameter::Nacl => "nacl",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Parameter::LightIntensity => "Light intensity",
            Parameter::Temperature => "Temperature",
            Parameter::Hormone => "Hormone concentration",
            Parameter::Bicarbonate => "Bicarbonate",
            Parameter::NitrogenSource => "Nitrogen source",
            Parameter::PhosphorusSource => "Phosphorus source",
            Parameter::CultivationTime => "Cultivation time",
            Parameter::Nacl => "Sodium chloride",
        }
    }

    /// Physical unit
    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::LightIntensity => "µmol·m⁻²·s⁻¹",
            Parameter::Temperature => "°C",
            Parameter::Hormone => "mol/L",
            Parameter::Bicarbonate
            | Parameter::NitrogenSource
            | Parameter::PhosphorusSource
            | Parameter::Nacl => "mmol/L",
            Parameter::CultivationTime => "days",
        }
    }

    /// Operator-facing domain `(min, max)`.
    ///
    /// Values outside the domain are still accepted by the pipeline; the
    /// model simply was not trained there.
    pub fn domain(&self) -> (f64, f64) {
        match self {
            Parameter::LightIntensity => (0.0, 200.0),
            Parameter::Temperature => (20.0, 40.0),
            Parameter::Hormone => (0.0, 1.0),
            Parameter::Bicarbonate => (0.0, 200.0),
            Parameter::NitrogenSource => (0.0, 50.0),
            Parameter::PhosphorusSource => (0.0, 10.0),
            Parameter::CultivationTime => (0.0, 30.0),
            Parameter::Nacl => (0.0, 200.0),
        }
    }

    /// Starting value offered to the operator
    pub fn default_value(&self) -> f64 {
        match self {
            Parameter::LightIntensity => 100.0,
            Parameter::Temperature => 30.0,
            Parameter::Hormone => 0.5,
            Parameter::Bicarbonate => 100.0,
            Parameter::NitrogenSource => 25.0,
            Parameter::PhosphorusSource => 5.0,
            Parameter::CultivationTime => 15.0,
            Parameter::Nacl => 100.0,
        }
    }

    /// Input granularity offered to the operator
    pub fn step(&self) -> f64 {
        match self {
            Parameter::Hormone => 0.01,
            Parameter::Bicarbonate | Parameter::Nacl => 1.0,
            Parameter::CultivationTime => 0.5,
            _ => 0.1,
        }
    }

    /// Whether `value` lies inside the operator domain (inclusive)
    pub fn in_domain(&self, value: f64) -> bool {
        let (min, max) = self.domain();
        value >= min && value <= max
    }
}

/// Predicted yield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Dry weight (g/L)
    DryWeight,
    /// Carotenoid yield (mg/L)
    CarotenoidYield,
}

impl Target {
    /// All targets in model output order
    pub const ALL: [Target; 2] = [Target::DryWeight, Target::CarotenoidYield];

    /// Position in the yield vector
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            Target::DryWeight => "dry_weight",
            Target::CarotenoidYield => "carotenoid_yield",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Target::DryWeight => "Dry weight",
            Target::CarotenoidYield => "Carotenoid yield",
        }
    }

    /// Physical unit
    pub fn unit(&self) -> &'static str {
        match self {
            Target::DryWeight => "g/L",
            Target::CarotenoidYield => "mg/L",
        }
    }
}
