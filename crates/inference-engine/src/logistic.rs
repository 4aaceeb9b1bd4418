//! Logistic Regression

use crate::classifier::{sigmoid, Classifier};
use crate::InferenceError;
use serde::{Deserialize, Serialize};

/// Linear model with a logistic link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, InferenceError> {
        let model = Self {
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    pub(crate) fn validate(&self) -> Result<(), InferenceError> {
        if self.coefficients.is_empty() {
            return Err(InferenceError::InvalidModel("no coefficients".into()));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(InferenceError::InvalidModel("non-finite parameter".into()));
        }
        Ok(())
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba_row(&self, row: &[f64]) -> Result<[f64; 2], InferenceError> {
        self.check_width(row)?;
        let margin = self.intercept
            + row
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>();
        let p_leave = sigmoid(margin);
        Ok([1.0 - p_leave, p_leave])
    }
}
