//! Home Page Route

use axum::{extract::State, Json};
use feature_aligner::RawRecord;
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

pub const TITLE: &str = "Employee Attrition Prediction System";

pub const PROBLEM_STATEMENT: &str = "The model predicts whether an employee will leave or stay \
and helps HR teams proactively identify employees at risk of leaving.";

/// First rows of the historical dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetPreview {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub title: &'static str,
    pub problem_statement: &'static str,
    /// `None` when no dataset could be loaded at startup
    pub preview: Option<DatasetPreview>,
}

/// Get the home page content
pub async fn get_home(State(state): State<Arc<AppState>>) -> Json<HomeResponse> {
    Json(HomeResponse {
        title: TITLE,
        problem_statement: PROBLEM_STATEMENT,
        preview: state.preview.clone(),
    })
}
