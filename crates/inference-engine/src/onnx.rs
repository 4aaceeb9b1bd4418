//! ONNX Classifier via tract
//!
//! Expects a converted binary classifier whose last output is the
//! probability tensor (`[1, 2]`, or `[1, 1]` holding the positive class).
//! Converters must be run without a ZipMap post-processor.

use crate::classifier::Classifier;
use crate::InferenceError;
use std::fmt;
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;
use tracing::info;

/// ONNX model compiled for single-row input
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    n_features: usize,
    path: PathBuf,
}

impl OnnxClassifier {
    /// Load and optimize a model for input shape `[1, n_features]`
    pub fn load<P: AsRef<Path>>(path: P, n_features: usize) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, n_features]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        info!("Loaded ONNX model from {} ({} features)", path.display(), n_features);
        Ok(Self {
            plan,
            n_features,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("path", &self.path)
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba_row(&self, row: &[f64]) -> Result<[f64; 2], InferenceError> {
        self.check_width(row)?;
        let failed = |e: &dyn fmt::Display| InferenceError::InferenceFailed(e.to_string());

        let input: Tensor = tract_ndarray::Array2::from_shape_vec(
            (1, self.n_features),
            row.iter().map(|&v| v as f32).collect(),
        )
        .map_err(|e| failed(&e))?
        .into();

        let outputs = self.plan.run(tvec!(input.into())).map_err(|e| failed(&e))?;
        let probabilities = outputs
            .last()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".into()))?
            .to_array_view::<f32>()
            .map_err(|e| failed(&e))?
            .iter()
            .map(|&p| p as f64)
            .collect::<Vec<f64>>();

        match probabilities.as_slice() {
            [p_stay, p_leave] => Ok([*p_stay, *p_leave]),
            [p_leave] => Ok([1.0 - *p_leave, *p_leave]),
            other => Err(InferenceError::InferenceFailed(format!(
                "expected 1 or 2 probabilities per row, got {}",
                other.len()
            ))),
        }
    }
}
