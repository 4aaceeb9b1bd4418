//! Prediction Pipeline

use crate::artifacts::ModelArtifacts;
use crate::decision::Prediction;
use crate::InferenceError;
use feature_aligner::{align_with_report, encode_for_schema, RawRecord};
use scaler::{ScaledTable, ScalingError};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced to a single prediction request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Width disagreement at the scaler or the model
    #[error("Schema mismatch at {stage}: expected {expected} features, received {actual}")]
    SchemaMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Input lacks values the model cannot do without
    #[error("Missing values for {}", columns.join(", "))]
    MissingValues { columns: Vec<String> },

    #[error(transparent)]
    Scaling(ScalingError),

    #[error(transparent)]
    Inference(InferenceError),
}

impl From<ScalingError> for PipelineError {
    fn from(err: ScalingError) -> Self {
        match err {
            ScalingError::SchemaMismatch { expected, actual } => PipelineError::SchemaMismatch {
                stage: "scaler",
                expected,
                actual,
            },
            other => PipelineError::Scaling(other),
        }
    }
}

impl From<InferenceError> for PipelineError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::InvalidInputShape { expected, actual } => {
                PipelineError::SchemaMismatch {
                    stage: "model",
                    expected,
                    actual,
                }
            }
            other => PipelineError::Inference(other),
        }
    }
}

/// encode → align → scale → predict over shared, read-only artifacts
#[derive(Debug, Clone)]
pub struct AttritionPipeline {
    artifacts: Arc<ModelArtifacts>,
}

impl AttritionPipeline {
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Encode, align and scale a batch
    pub fn prepare(&self, records: &[RawRecord]) -> Result<ScaledTable, PipelineError> {
        let encoded = encode_for_schema(records, self.artifacts.schema());
        let (aligned, report) = align_with_report(&encoded, self.artifacts.schema());
        debug!(
            "Prepared {} records: {} columns padded, {} dropped",
            aligned.len(),
            report.padded.len(),
            report.dropped.len()
        );
        Ok(self.artifacts.scaler().transform(&aligned)?)
    }

    /// Score prepared rows
    pub fn score(&self, scaled: &ScaledTable) -> Result<Vec<Prediction>, PipelineError> {
        if !self.artifacts.model().handles_missing() {
            let columns = missing_columns(scaled);
            if !columns.is_empty() {
                return Err(PipelineError::MissingValues { columns });
            }
        }
        let probabilities = self.artifacts.model().predict_proba(scaled.rows())?;
        probabilities
            .into_iter()
            .map(|proba| Prediction::from_proba(proba).map_err(PipelineError::from))
            .collect()
    }

    /// Predict a batch of records
    pub fn predict_batch(&self, records: &[RawRecord]) -> Result<Vec<Prediction>, PipelineError> {
        let scaled = self.prepare(records)?;
        self.score(&scaled)
    }

    /// Predict one employee
    pub fn predict_one(&self, record: &RawRecord) -> Result<Prediction, PipelineError> {
        let mut predictions = self.predict_batch(std::slice::from_ref(record))?;
        predictions.pop().ok_or_else(|| {
            PipelineError::Inference(InferenceError::InferenceFailed(
                "no prediction produced".into(),
            ))
        })
    }
}

/// Schema columns holding NaN in any row
fn missing_columns(scaled: &ScaledTable) -> Vec<String> {
    scaled
        .columns()
        .iter()
        .enumerate()
        .filter(|(j, _)| scaled.rows().iter().any(|row| row[*j].is_nan()))
        .map(|(_, name)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::decision::AttritionDecision;
    use crate::logistic::LogisticRegression;
    use crate::trees::{Tree, TreeEnsemble, TreeEnsembleSpec, TreeNode};
    use feature_aligner::{FeatureSchema, FieldValue};
    use scaler::FittedScaler;

    fn schema() -> FeatureSchema {
        FeatureSchema::with_categorical_fields(
            [
                "Age",
                "MonthlyIncome",
                "BusinessTravel_Travel_Frequently",
                "BusinessTravel_Travel_Rarely",
                "Gender_Male",
                "OverTime_Yes",
            ],
            ["BusinessTravel", "Gender", "OverTime"],
        )
        .unwrap()
    }

    /// Overtime and frequent travel dominate the score
    fn pipeline() -> AttritionPipeline {
        let scaler = FittedScaler::standard(
            vec![36.0, 6500.0, 0.2, 0.7, 0.6, 0.3],
            vec![9.0, 4700.0, 0.4, 0.45, 0.49, 0.45],
        )
        .unwrap();
        let model = LogisticRegression::new(vec![-0.3, -0.4, 0.6, -0.1, 0.1, 1.4], -1.2).unwrap();
        let artifacts = ModelArtifacts::new(schema(), scaler, Box::new(model)).unwrap();
        AttritionPipeline::new(Arc::new(artifacts))
    }

    fn employee(overtime: &str, travel: &str) -> RawRecord {
        RawRecord::new()
            .with("BusinessTravel", travel)
            .with("Gender", "Male")
            .with("OverTime", overtime)
            .with("Age", 29)
            .with("MonthlyIncome", 3200)
    }

    #[test]
    fn test_overtime_frequent_traveller_leaves() {
        let prediction = pipeline()
            .predict_one(&employee("Yes", "Travel_Frequently"))
            .unwrap();
        assert_eq!(prediction.decision, AttritionDecision::Leave);
        assert!(prediction.probability >= 0.5);
    }

    #[test]
    fn test_no_overtime_rare_traveller_stays() {
        let prediction = pipeline()
            .predict_one(&employee("No", "Travel_Rarely"))
            .unwrap();
        assert_eq!(prediction.decision, AttritionDecision::Stay);
    }

    #[test]
    fn test_scaled_width_matches_model_for_every_batch_size() {
        let pipeline = pipeline();
        for size in 1..=25 {
            let batch: Vec<RawRecord> = (0..size)
                .map(|i| match i % 3 {
                    0 => employee("Yes", "Travel_Rarely"),
                    1 => RawRecord::new()
                        .with("Age", 20 + i as i32)
                        .with("MonthlyIncome", 4000),
                    _ => employee("No", "Travel_Frequently").with("Department", "Sales"),
                })
                .collect();
            let scaled = pipeline.prepare(&batch).unwrap();
            assert_eq!(scaled.len(), size);
            assert_eq!(scaled.width(), pipeline.artifacts().model().n_features());
            assert_eq!(pipeline.score(&scaled).unwrap().len(), size);
        }
    }

    #[test]
    fn test_batch_is_row_independent_for_full_records() {
        let pipeline = pipeline();
        let a = employee("Yes", "Travel_Frequently");
        let b = employee("No", "Travel_Rarely");

        let batch = pipeline.predict_batch(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(batch[0], pipeline.predict_one(&a).unwrap());
        assert_eq!(batch[1], pipeline.predict_one(&b).unwrap());
    }

    #[test]
    fn test_empty_batch() {
        assert!(pipeline().predict_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_numeric_is_rejected_before_scoring() {
        let record = employee("Yes", "Travel_Rarely").with("Age", FieldValue::Missing);
        let err = pipeline().predict_one(&record).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingValues {
                columns: vec!["Age".to_string()]
            }
        );
        assert_eq!(err.to_string(), "Missing values for Age");
    }

    #[test]
    fn test_tree_model_routes_missing_numeric() {
        let scaler = FittedScaler::identity(6);
        let model = TreeEnsemble::new(TreeEnsembleSpec {
            n_features: 6,
            base_margin: 0.0,
            trees: vec![Tree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 0,
                        threshold: 30.0,
                        left: 1,
                        right: 2,
                        default_left: false,
                    },
                    TreeNode::Leaf { leaf: -2.0 },
                    TreeNode::Leaf { leaf: 2.0 },
                ],
            }],
        })
        .unwrap();
        let artifacts = ModelArtifacts::new(schema(), scaler, Box::new(model)).unwrap();
        let pipeline = AttritionPipeline::new(Arc::new(artifacts));

        let record = RawRecord::new().with("Age", FieldValue::Missing);
        let prediction = pipeline.predict_one(&record).unwrap();
        assert_eq!(prediction.decision, AttritionDecision::Leave);
    }

    #[test]
    fn test_free_text_column_is_not_expanded() {
        let pipeline = pipeline();
        let batch: Vec<RawRecord> = (0..5_000)
            .map(|i| employee("No", "Travel_Rarely").with("EmployeeName", format!("emp{}", i)))
            .collect();

        let scaled = pipeline.prepare(&batch).unwrap();
        assert_eq!(scaled.width(), 6);
        assert_eq!(pipeline.score(&scaled).unwrap().len(), 5_000);
    }

    #[test]
    fn test_shape_errors_become_schema_mismatch() {
        let err: PipelineError = ScalingError::SchemaMismatch {
            expected: 6,
            actual: 5,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Schema mismatch at scaler: expected 6 features, received 5"
        );

        let err: PipelineError = InferenceError::InvalidInputShape {
            expected: 6,
            actual: 7,
        }
        .into();
        assert!(matches!(err, PipelineError::SchemaMismatch { stage: "model", .. }));
    }
}
