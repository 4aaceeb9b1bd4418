//! Attrition Decision Rule

use crate::InferenceError;
use serde::{Deserialize, Serialize};

/// Probability at or above which an employee is predicted to leave
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Binary outcome shown to HR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttritionDecision {
    Leave,
    Stay,
}

impl AttritionDecision {
    /// Apply the fixed threshold; probabilities outside [0, 1] (or NaN) are rejected
    pub fn from_probability(probability: f64) -> Result<Self, InferenceError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::InvalidProbability(probability));
        }
        Ok(if probability >= DECISION_THRESHOLD {
            AttritionDecision::Leave
        } else {
            AttritionDecision::Stay
        })
    }

    /// Short label used in batch results
    pub fn label(&self) -> &'static str {
        match self {
            AttritionDecision::Leave => "Leave",
            AttritionDecision::Stay => "Stay",
        }
    }

    /// Sentence shown for an individual prediction
    pub fn message(&self) -> &'static str {
        match self {
            AttritionDecision::Leave => "YES (Employee likely to Leave)",
            AttritionDecision::Stay => "NO (Employee likely to Stay)",
        }
    }
}

/// Scored employee
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability of the positive ("will leave") class
    pub probability: f64,
    pub decision: AttritionDecision,
}

impl Prediction {
    /// Build from a classifier's `[p_stay, p_leave]` output
    pub fn from_proba(proba: [f64; 2]) -> Result<Self, InferenceError> {
        let probability = proba[1];
        Ok(Self {
            probability,
            decision: AttritionDecision::from_probability(probability)?,
        })
    }

    /// Probability rounded to two decimals for display
    pub fn rounded_probability(&self) -> f64 {
        (self.probability * 100.0).round() / 100.0
    }
}
