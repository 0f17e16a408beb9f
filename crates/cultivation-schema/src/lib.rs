//! Cultivation Schema
//!
//! Named input parameters and predicted yields shared by the scaler, the
//! model adapters and the prediction pipeline.

mod error;
mod parameter;
mod vectors;

pub use error::SchemaError;
pub use parameter::{Parameter, Target};
pub use vectors::{FeatureVector, YieldVector};

/// Number of cultivation parameters fed to the model
pub const FEATURE_DIMENSION: usize = 8;

/// Number of predicted yields
pub const TARGET_DIMENSION: usize = 2;
