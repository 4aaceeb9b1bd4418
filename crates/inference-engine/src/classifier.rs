//! Classifier Interface

use crate::InferenceError;
use std::fmt;

/// A fitted binary classifier scoring scaled rows
pub trait Classifier: fmt::Debug + Send + Sync {
    /// Short backend name for logs and health output
    fn kind(&self) -> &'static str;

    /// Input width the model was fitted on
    fn n_features(&self) -> usize;

    /// Whether NaN inputs have a defined path through the model
    fn handles_missing(&self) -> bool {
        false
    }

    /// `[p_stay, p_leave]` for one scaled row
    fn predict_proba_row(&self, row: &[f64]) -> Result<[f64; 2], InferenceError>;

    /// `[p_stay, p_leave]` for every row
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<[f64; 2]>, InferenceError> {
        rows.iter().map(|row| self.predict_proba_row(row)).collect()
    }

    /// Fail unless `row` has the fitted width
    fn check_width(&self, row: &[f64]) -> Result<(), InferenceError> {
        if row.len() != self.n_features() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.n_features(),
                actual: row.len(),
            });
        }
        Ok(())
    }
}

pub(crate) fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
