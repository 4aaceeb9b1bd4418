//! Model Performance Route

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::config::MetricEntry;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PerformanceResponse {
    pub model_kind: &'static str,
    pub metrics: Vec<MetricEntry>,
}

/// Get the offline evaluation figures of the loaded model
pub async fn get_performance(State(state): State<Arc<AppState>>) -> Json<PerformanceResponse> {
    Json(PerformanceResponse {
        model_kind: state.pipeline.artifacts().model().kind(),
        metrics: state.settings.performance.metrics.clone(),
    })
}
