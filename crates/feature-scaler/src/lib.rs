//! Feature and Target Scaling
//!
//! Maps raw cultivation parameters into the normalized space a model was
//! trained on, and maps normalized model outputs back to physical units.

mod error;
mod scaler;
mod transform;

pub use error::{ScalerError, ScalerSpace};
pub use scaler::FeatureScaler;
pub use transform::{FittedTransform, ScalingMethod};
