//! Parameter Schema Routes

use axum::Json;
use cultivation_schema::{Parameter, Target};
use serde::Serialize;

/// One adjustable cultivation parameter
#[derive(Debug, Serialize)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl From<Parameter> for ParameterInfo {
    fn from(param: Parameter) -> Self {
        let (min, max) = param.domain();
        Self {
            name: param.name(),
            label: param.label(),
            unit: param.unit(),
            min,
            max,
            default: param.default_value(),
            step: param.step(),
        }
    }
}

/// One predicted yield
#[derive(Debug, Serialize)]
pub struct TargetInfo {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
}

impl From<Target> for TargetInfo {
    fn from(target: Target) -> Self {
        Self {
            name: target.name(),
            label: target.label(),
            unit: target.unit(),
        }
    }
}

/// Response for parameters endpoint
#[derive(Debug, Serialize)]
pub struct ParametersResponse {
    pub parameters: Vec<ParameterInfo>,
    pub targets: Vec<TargetInfo>,
}

/// Describe model inputs and outputs, in fitted order
pub async fn get_parameters() -> Json<ParametersResponse> {
    Json(ParametersResponse {
        parameters: Parameter::ALL.into_iter().map(ParameterInfo::from).collect(),
        targets: Target::ALL.into_iter().map(TargetInfo::from).collect(),
    })
}
