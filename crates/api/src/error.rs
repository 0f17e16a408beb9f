//! API Error Types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feature_scaler::ScalerError;
use prediction_pipeline::PipelineError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use yield_model::ModelError;

/// Errors during startup or request handling
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Logging setup failed: {0}")]
    Logging(String),
    #[error("Metrics setup failed: {0}")]
    Metrics(String),
    #[error("Scaler artifact: {0}")]
    Scaler(#[from] ScalerError),
    #[error("Model artifact: {0}")]
    Model(#[from] ModelError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid request body: {message}")]
    InvalidBody {
        status: StatusCode,
        message: String,
        field: Option<&'static str>,
    },
}

impl ApiError {
    /// Body field that is missing or not a number
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::InvalidBody {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
            field: Some(field),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
            field: None,
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, field) = match &self {
            ApiError::Pipeline(PipelineError::InvalidInput { field, .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Some(*field))
            }
            ApiError::InvalidBody { status, field, .. } => (*status, *field),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            field,
        };
        (status, Json(body)).into_response()
    }
}
