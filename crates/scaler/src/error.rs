//! Scaling Error Types

use thiserror::Error;

/// Errors during scaling
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScalingError {
    /// Input width differs from the fitted dimensionality
    #[error("Feature width mismatch: scaler was fitted on {expected} columns, received {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// Fitted parameters are inconsistent
    #[error("Invalid scaler parameters: {0}")]
    InvalidParameters(String),

    /// Artifact could not be read or parsed
    #[error("Failed to load scaler: {0}")]
    Load(String),
}
