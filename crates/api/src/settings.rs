//! Server Configuration
//!
//! Layered: built-in defaults, then an optional config file, then
//! `YIELD__SECTION__KEY` environment variables.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Config file looked up when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "yield-predictor";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Frozen model and scaler artifacts, loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// `.onnx` graph or JSON model artifact
    pub model_path: PathBuf,
    /// Feature transform JSON
    pub feature_scaler_path: PathBuf,
    /// Target transform JSON
    pub target_scaler_path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("artifacts/ann_model.onnx"),
            feature_scaler_path: PathBuf::from("artifacts/scaler_features.json"),
            target_scaler_path: PathBuf::from("artifacts/scaler_targets.json"),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Prometheus exporter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Install the recorder and serve `/metrics`
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist; otherwise `yield-predictor.{toml,json,yaml}`
    /// in the working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .set_default("server.bind_addr", defaults.server.bind_addr)?
            .set_default(
                "artifacts.model_path",
                defaults.artifacts.model_path.to_string_lossy().into_owned(),
            )?
            .set_default(
                "artifacts.feature_scaler_path",
                defaults.artifacts.feature_scaler_path.to_string_lossy().into_owned(),
            )?
            .set_default(
                "artifacts.target_scaler_path",
                defaults.artifacts.target_scaler_path.to_string_lossy().into_owned(),
            )?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)?
            .set_default("metrics.enabled", defaults.metrics.enabled)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("YIELD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
