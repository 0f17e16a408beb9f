//! Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use cultivation_schema::{FeatureVector, Parameter, Target, YieldVector, FEATURE_DIMENSION};
use prediction_pipeline::{DomainWarning, InputValidator};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// Response for predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    /// Conditions the prediction was made for
    pub inputs: FeatureVector,
    /// Predicted yields, never negative
    pub prediction: YieldVector,
    /// Unit of each predicted yield
    pub units: BTreeMap<&'static str, &'static str>,
    /// Inputs outside the range the model was built for
    pub warnings: Vec<DomainWarning>,
}

/// Predict yields for the posted cultivation conditions
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(body) = body?;
    let inputs = parse_features(&body)?;
    let prediction = state.pipeline.predict(&inputs)?;

    Ok(Json(PredictionResponse {
        inputs,
        prediction,
        units: Target::ALL
            .into_iter()
            .map(|target| (target.name(), target.unit()))
            .collect(),
        warnings: InputValidator::check_domain(&inputs),
    }))
}

/// Read the conditions field by field so a bad body names the field at fault
fn parse_features(body: &Value) -> Result<FeatureVector, ApiError> {
    let object = body.as_object().ok_or_else(|| ApiError::InvalidBody {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        message: "expected a JSON object of cultivation conditions".to_string(),
        field: None,
    })?;

    let mut values = [0.0; FEATURE_DIMENSION];
    for param in Parameter::ALL {
        let name = param.name();
        values[param.index()] = match object.get(name) {
            None => {
                return Err(ApiError::invalid_field(name, format!("missing field `{name}`")));
            }
            Some(value) => value.as_f64().ok_or_else(|| {
                ApiError::invalid_field(name, format!("`{name}` must be a number, got {value}"))
            })?,
        };
    }
    Ok(FeatureVector::from_array(values))
}
