//! Prediction Routes
//!
//! Individual prediction from a form submission and batch prediction over
//! an uploaded table of future employees.

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use dataset::{Dataset, TARGET_COLUMN};
use feature_aligner::{FeatureSchema, FieldValue, RawRecord};
use inference_engine::{AttritionDecision, Prediction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::routes::home::DatasetPreview;
use crate::AppState;

/// Result columns appended to every uploaded row
pub const PROBABILITY_COLUMN: &str = "Attrition_Probability";
pub const PREDICTION_COLUMN: &str = "Prediction";

const CATEGORICAL_INPUTS: &[(&str, &str, &[&str])] = &[
    ("BusinessTravel", "Business Travel", &["Travel_Rarely", "Travel_Frequently"]),
    ("Department", "Department", &["Sales", "Research & Development"]),
    ("EducationField", "Education Field", &["Life Sciences", "Medical", "Other"]),
    ("Gender", "Gender", &["Male", "Female"]),
    (
        "JobRole",
        "Job Role",
        &[
            "Sales Executive",
            "Research Scientist",
            "Laboratory Technician",
            "Healthcare Representative",
            "Manufacturing Director",
        ],
    ),
    ("MaritalStatus", "Marital Status", &["Married", "Single"]),
    ("OverTime", "OverTime", &["Yes", "No"]),
];

const NUMERIC_INPUTS: &[NumericInput] = &[
    NumericInput::number("Age", "Age", 18, 65, 30),
    NumericInput::number("MonthlyIncome", "Monthly Income", 1000, 200_000, 5000),
    NumericInput::slider("JobSatisfaction", "Job Satisfaction (1-4)", 1, 4, 3),
    NumericInput::slider("WorkLifeBalance", "Work Life Balance (1-4)", 1, 4, 3),
    NumericInput::number("TotalWorkingYears", "Total Working Years", 0, 40, 10),
];

/// How a numeric input is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    Number,
    Slider,
}

/// Bounded integer input
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NumericInput {
    pub field: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl NumericInput {
    const fn number(
        field: &'static str,
        label: &'static str,
        min: i64,
        max: i64,
        default: i64,
    ) -> Self {
        Self {
            field,
            label,
            widget: Widget::Number,
            min,
            max,
            default,
        }
    }

    const fn slider(
        field: &'static str,
        label: &'static str,
        min: i64,
        max: i64,
        default: i64,
    ) -> Self {
        Self {
            field,
            label,
            widget: Widget::Slider,
            min,
            max,
            default,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryOption {
    pub value: &'static str,
    /// False when the training data never produced this indicator column;
    /// such a choice encodes as all zeros for its field
    pub known_to_model: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoricalInput {
    pub field: &'static str,
    pub label: &'static str,
    pub options: Vec<CategoryOption>,
}

/// Individual prediction form
#[derive(Debug, Serialize)]
pub struct FormDefinition {
    pub categorical: Vec<CategoricalInput>,
    pub numeric: Vec<NumericInput>,
}

impl FormDefinition {
    pub fn for_schema(schema: &FeatureSchema) -> Self {
        let categorical = CATEGORICAL_INPUTS
            .iter()
            .map(|&(field, label, options)| CategoricalInput {
                field,
                label,
                options: options
                    .iter()
                    .map(|&value| CategoryOption {
                        value,
                        known_to_model: schema.contains(&format!("{}_{}", field, value)),
                    })
                    .collect(),
            })
            .collect();

        Self {
            categorical,
            numeric: NUMERIC_INPUTS.to_vec(),
        }
    }
}

/// Get the individual prediction form
pub async fn get_form(State(state): State<Arc<AppState>>) -> Json<FormDefinition> {
    Json(FormDefinition::for_schema(state.pipeline.artifacts().schema()))
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub probability: f64,
    pub rounded_probability: f64,
    pub decision: AttritionDecision,
    pub label: &'static str,
    pub message: &'static str,
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            probability: prediction.probability,
            rounded_probability: prediction.rounded_probability(),
            decision: prediction.decision,
            label: prediction.decision.label(),
            message: prediction.decision.message(),
        }
    }
}

/// Predict attrition for one employee
pub async fn predict_one(
    State(state): State<Arc<AppState>>,
    Json(record): Json<RawRecord>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let prediction = state.pipeline.predict_one(&record).map_err(|e| {
        metrics::counter!("attrition_pipeline_failures_total", "mode" => "single").increment(1);
        e
    })?;
    metrics::counter!("attrition_predictions_total", "mode" => "single").increment(1);
    metrics::counter!("attrition_records_scored_total").increment(1);

    debug!(
        "Single prediction: p={:.4} -> {}",
        prediction.probability,
        prediction.decision.label()
    );
    Ok(Json(prediction.into()))
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    /// Name of the uploaded file; its extension selects the reader
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// Uploaded rows as received, before the target column is dropped
    pub preview: DatasetPreview,
    pub count: usize,
    pub leave_count: usize,
    pub results: Vec<RawRecord>,
}

/// Predict attrition for every row of an uploaded table
pub async fn predict_batch(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BatchQuery>,
    body: Bytes,
) -> Result<Json<BatchResponse>, ApiError> {
    let mut dataset = Dataset::from_upload(&query.filename, &body)?;
    let preview = DatasetPreview {
        headers: dataset.headers().to_vec(),
        rows: dataset.head(state.settings.dataset.preview_rows).to_vec(),
    };

    if dataset.drop_column(TARGET_COLUMN) {
        debug!("Dropped {} column from upload", TARGET_COLUMN);
    }

    let predictions = state.pipeline.predict_batch(dataset.records()).map_err(|e| {
        metrics::counter!("attrition_pipeline_failures_total", "mode" => "batch").increment(1);
        e
    })?;

    let results: Vec<RawRecord> = dataset
        .into_records()
        .into_iter()
        .zip(&predictions)
        .map(|(mut record, prediction)| {
            record.insert(PROBABILITY_COLUMN, FieldValue::Number(prediction.probability));
            record.insert(PREDICTION_COLUMN, FieldValue::from(prediction.decision.label()));
            record
        })
        .collect();

    let leave_count = predictions
        .iter()
        .filter(|p| p.decision == AttritionDecision::Leave)
        .count();

    metrics::counter!("attrition_predictions_total", "mode" => "batch").increment(1);
    metrics::counter!("attrition_records_scored_total").increment(results.len() as u64);
    info!(
        "Scored {} ({} rows, {} likely to leave)",
        query.filename,
        results.len(),
        leave_count
    );

    Ok(Json(BatchResponse {
        preview,
        count: results.len(),
        leave_count,
        results,
    }))
}
