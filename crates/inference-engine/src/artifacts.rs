//! Model Artifacts
//!
//! The fitted classifier, scaler and feature names are loaded once at
//! startup into an immutable [`ModelArtifacts`] handle.

use crate::classifier::Classifier;
use crate::logistic::LogisticRegression;
use crate::onnx::OnnxClassifier;
use crate::trees::{TreeEnsemble, TreeEnsembleSpec};
use crate::InferenceError;
use feature_aligner::{AlignmentError, FeatureSchema};
use scaler::{FittedScaler, ScalingError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors while loading artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid feature schema: {0}")]
    Schema(#[from] AlignmentError),

    #[error(transparent)]
    Scaler(#[from] ScalingError),

    #[error(transparent)]
    Model(#[from] InferenceError),

    /// Artifacts were fitted on different feature layouts
    #[error("{artifact} expects {actual} features but the feature schema has {expected}")]
    WidthMismatch {
        artifact: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Where the three artifacts live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    /// `.json` model spec or `.onnx` graph
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    /// JSON array of column names
    pub feature_names_path: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("artifacts/model.json"),
            scaler_path: PathBuf::from("artifacts/scaler.json"),
            feature_names_path: PathBuf::from("artifacts/feature_names.json"),
        }
    }
}

/// JSON model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    TreeEnsemble(TreeEnsembleSpec),
    LogisticRegression(LogisticRegression),
}

impl ModelSpec {
    /// Validate and build the classifier
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, InferenceError> {
        match self {
            ModelSpec::TreeEnsemble(spec) => Ok(Box::new(TreeEnsemble::new(spec)?)),
            ModelSpec::LogisticRegression(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

/// Read-only process-wide model state
#[derive(Debug)]
pub struct ModelArtifacts {
    schema: FeatureSchema,
    scaler: FittedScaler,
    model: Box<dyn Classifier>,
}

impl ModelArtifacts {
    /// Assemble artifacts, checking that all three agree on width
    pub fn new(
        schema: FeatureSchema,
        scaler: FittedScaler,
        model: Box<dyn Classifier>,
    ) -> Result<Self, ArtifactError> {
        if scaler.width() != schema.width() {
            return Err(ArtifactError::WidthMismatch {
                artifact: "scaler",
                expected: schema.width(),
                actual: scaler.width(),
            });
        }
        if model.n_features() != schema.width() {
            return Err(ArtifactError::WidthMismatch {
                artifact: "model",
                expected: schema.width(),
                actual: model.n_features(),
            });
        }
        Ok(Self {
            schema,
            scaler,
            model,
        })
    }

    /// Load all artifacts from disk
    pub fn load(
        paths: &ArtifactPaths,
        categorical_fields: &[String],
    ) -> Result<Self, ArtifactError> {
        let columns: Vec<String> = read_json(&paths.feature_names_path)?;
        let schema =
            FeatureSchema::with_categorical_fields(columns, categorical_fields.iter().cloned())?;
        info!(
            "Loaded feature schema with {} columns from {}",
            schema.width(),
            paths.feature_names_path.display()
        );

        let scaler = FittedScaler::from_json_file(&paths.scaler_path)?;
        let model = load_model(&paths.model_path, schema.width())?;
        info!("Loaded {} model from {}", model.kind(), paths.model_path.display());

        Self::new(schema, scaler, model)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scaler(&self) -> &FittedScaler {
        &self.scaler
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }
}

fn load_model(path: &Path, n_features: usize) -> Result<Box<dyn Classifier>, ArtifactError> {
    let is_onnx = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("onnx"));
    if is_onnx {
        return Ok(Box::new(OnnxClassifier::load(path, n_features)?));
    }
    let spec: ModelSpec = read_json(path)?;
    Ok(spec.into_classifier()?)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    let data = std::fs::read_to_string(path).map_err(|e| ArtifactError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&data).map_err(|e| ArtifactError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
