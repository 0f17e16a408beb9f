//! Yield Predictor API Server
//!
//! REST front end for the prediction pipeline: parameter schema, predictions,
//! health and Prometheus metrics.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cultivation_schema::{FEATURE_DIMENSION, TARGET_DIMENSION};
use feature_scaler::FeatureScaler;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prediction_pipeline::PredictionPipeline;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod routes;
mod settings;

pub use error::{ApiError, ErrorResponse};
pub use settings::{AppConfig, ArtifactConfig, LoggingConfig, MetricsConfig, ServerConfig};

/// Application state shared across handlers.
///
/// Read-only after startup, so handlers share it without locking.
pub struct AppState {
    /// Prediction pipeline
    pub pipeline: PredictionPipeline,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus handle, when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(pipeline: PredictionPipeline) -> Self {
        Self {
            pipeline,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub pipeline: PipelineInfo,
}

/// Shape of the loaded pipeline
#[derive(Debug, Serialize)]
pub struct PipelineInfo {
    pub features: usize,
    pub targets: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/parameters", get(routes::parameters::get_parameters))
        .route("/api/v1/predict", post(routes::predictions::predict))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        pipeline: PipelineInfo {
            features: FEATURE_DIMENSION,
            targets: TARGET_DIMENSION,
        },
    })
}

/// Prometheus scrape handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}

/// Load the frozen artifacts and wire the pipeline. Fails fast on any
/// missing or inconsistent artifact.
pub fn load_pipeline(artifacts: &ArtifactConfig) -> Result<PredictionPipeline, ApiError> {
    info!(
        "Loading artifacts: model={}, feature_scaler={}, target_scaler={}",
        artifacts.model_path.display(),
        artifacts.feature_scaler_path.display(),
        artifacts.target_scaler_path.display()
    );
    let scaler =
        FeatureScaler::from_json_files(&artifacts.feature_scaler_path, &artifacts.target_scaler_path)?;
    let model = yield_model::load_model(&artifacts.model_path, FEATURE_DIMENSION, TARGET_DIMENSION)?;
    Ok(PredictionPipeline::new(scaler, model)?)
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), ApiError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| ApiError::Logging(format!("unknown log level '{}'", config.level)))?;

    let result = if config.json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    result.map_err(|e| ApiError::Logging(e.to_string()))
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> Result<PrometheusHandle, ApiError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::Metrics(e.to_string()))
}

/// Run the server
pub async fn run_server(config: AppConfig) -> Result<(), ApiError> {
    let pipeline = load_pipeline(&config.artifacts)?;

    let mut state = AppState::new(pipeline);
    if config.metrics.enabled {
        state = state.with_metrics(install_metrics()?);
    }
    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr.as_str()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use feature_scaler::FittedTransform;
    use tower::ServiceExt;
    use yield_model::{LinearModel, ModelArtifact};

    fn identity(dim: usize) -> FittedTransform {
        FittedTransform::Standard {
            mean: vec![0.0; dim],
            scale: vec![1.0; dim],
        }
    }

    fn test_pipeline() -> PredictionPipeline {
        let scaler =
            FeatureScaler::from_transforms(identity(FEATURE_DIMENSION), identity(TARGET_DIMENSION)).unwrap();
        let model = Arc::new(LinearModel::projection(FEATURE_DIMENSION, TARGET_DIMENSION).unwrap());
        PredictionPipeline::new(scaler, model).unwrap()
    }

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(test_pipeline()))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = create_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_predict(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/predict")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["pipeline"]["features"], 8);
    }

    #[tokio::test]
    async fn test_parameters_schema() {
        let request = Request::builder().uri("/api/v1/parameters").body(Body::empty()).unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::OK);

        let params = json["parameters"].as_array().unwrap();
        assert_eq!(params.len(), 8);
        assert_eq!(params[0]["name"], "light_intensity");
        assert_eq!(params[1]["min"], 20.0);
        assert_eq!(params[6]["step"], 0.5);
        assert_eq!(json["targets"][1]["unit"], "mg/L");
    }

    #[tokio::test]
    async fn test_predict() {
        let body = serde_json::json!({
            "light_intensity": 100.0,
            "temperature": 30.0,
            "hormone": 0.5,
            "bicarbonate": 100.0,
            "nitrogen_source": 25.0,
            "phosphorus_source": 5.0,
            "cultivation_time": 15.0,
            "nacl": 100.0
        });
        let (status, json) = send(post_predict(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prediction"]["dry_weight"], 100.0);
        assert_eq!(json["prediction"]["carotenoid_yield"], 30.0);
        assert_eq!(json["units"]["dry_weight"], "g/L");
        assert!(json["warnings"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_predict_clamps_and_warns_out_of_domain() {
        let body = serde_json::json!({
            "light_intensity": 120.0,
            "temperature": -4.0,
            "hormone": 0.5,
            "bicarbonate": 100.0,
            "nitrogen_source": 25.0,
            "phosphorus_source": 5.0,
            "cultivation_time": 15.0,
            "nacl": 100.0
        });
        let (status, json) = send(post_predict(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prediction"]["carotenoid_yield"], 0.0);
        assert_eq!(json["warnings"][0]["field"], "temperature");
    }

    #[tokio::test]
    async fn test_predict_rejects_missing_field() {
        let body = serde_json::json!({ "light_intensity": 100.0 });
        let (status, json) = send(post_predict(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["field"], "temperature");
        assert!(json["error"].as_str().unwrap().contains("temperature"));
    }

    #[tokio::test]
    async fn test_predict_rejects_non_numeric_field() {
        let mut body = serde_json::to_value(cultivation_schema::FeatureVector::default()).unwrap();
        body["bicarbonate"] = serde_json::json!("high");
        let (status, json) = send(post_predict(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["field"], "bicarbonate");
    }

    #[tokio::test]
    async fn test_predict_malformed_json_has_json_error_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/predict")
            .header("content-type", "application/json")
            .body(Body::from("{\"light_intensity\": "))
            .unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
        assert!(json.get("field").is_none());
    }

    #[tokio::test]
    async fn test_metrics_rendered_with_recorder() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState::new(test_pipeline()).with_metrics(recorder.handle());
        metrics::with_local_recorder(&recorder, || {
            state
                .pipeline
                .predict(&cultivation_schema::FeatureVector::default())
                .unwrap();
        });

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = create_router(Arc::new(state)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("yield_pipeline_predictions_total 1"), "{text}");
    }

    #[tokio::test]
    async fn test_metrics_disabled_without_recorder() {
        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_input_maps_to_422() {
        let err = ApiError::from(prediction_pipeline::PipelineError::InvalidInput {
            field: "nacl",
            value: f64::NAN,
        });
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = ApiError::from(prediction_pipeline::PipelineError::ModelNotLoaded);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_load_pipeline_from_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactConfig {
            model_path: dir.path().join("model.json"),
            feature_scaler_path: dir.path().join("scaler_features.json"),
            target_scaler_path: dir.path().join("scaler_targets.json"),
        };
        let model = LinearModel::projection(FEATURE_DIMENSION, TARGET_DIMENSION).unwrap();
        std::fs::write(&artifacts.model_path, ModelArtifact::from(&model).to_json().unwrap()).unwrap();
        std::fs::write(
            &artifacts.feature_scaler_path,
            identity(FEATURE_DIMENSION).to_json().unwrap(),
        )
        .unwrap();
        std::fs::write(
            &artifacts.target_scaler_path,
            identity(TARGET_DIMENSION).to_json().unwrap(),
        )
        .unwrap();

        let pipeline = load_pipeline(&artifacts).unwrap();
        let yields = pipeline
            .predict(&cultivation_schema::FeatureVector::default())
            .unwrap();
        assert_eq!(yields.dry_weight, 100.0);

        // Swapped scalers are a wiring error and abort startup
        let swapped = ArtifactConfig {
            feature_scaler_path: artifacts.target_scaler_path.clone(),
            target_scaler_path: artifacts.feature_scaler_path.clone(),
            ..artifacts
        };
        assert!(matches!(load_pipeline(&swapped), Err(ApiError::Scaler(_))));
    }
}
