//! Attrition Inference Engine
//!
//! Classifier backends and the prediction pipeline:
//! encode → align → scale → predict.

mod artifacts;
mod classifier;
mod decision;
mod logistic;
mod onnx;
mod pipeline;
mod trees;

pub use artifacts::{ArtifactError, ArtifactPaths, ModelArtifacts, ModelSpec};
pub use classifier::Classifier;
pub use decision::{AttritionDecision, Prediction, DECISION_THRESHOLD};
pub use logistic::LogisticRegression;
pub use onnx::OnnxClassifier;
pub use pipeline::{AttritionPipeline, PipelineError};
pub use trees::{Tree, TreeEnsemble, TreeEnsembleSpec, TreeNode};

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Invalid model structure: {0}")]
    InvalidModel(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: model expects {expected} features, received {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Invalid probability {0}: must lie in [0, 1]")]
    InvalidProbability(f64),
}
