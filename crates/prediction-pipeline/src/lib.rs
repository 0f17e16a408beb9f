//! Yield Prediction Pipeline
//!
//! Turns raw cultivation parameters into physically valid yield estimates:
//! input validation, feature scaling, model evaluation, target
//! denormalization and clamping to the non-negative domain.

mod error;
mod pipeline;
mod validator;

pub use error::PipelineError;
pub use pipeline::PredictionPipeline;
pub use validator::{DomainWarning, InputValidator};
