//! Feature Scaling
//!
//! Applies the per-column affine transform fitted alongside the classifier.
//! Width disagreement between input and the fitted transform is the one
//! misalignment this stage can detect.

mod error;
mod scaler;

pub use error::ScalingError;
pub use scaler::{FittedScaler, ScaledTable, ScalingMethod};
