//! Employee Attrition Dashboard API
//!
//! REST endpoints behind the dashboard tabs: home, model performance,
//! individual prediction and batch prediction.

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use dataset::Dataset;
use inference_engine::{AttritionPipeline, ModelArtifacts};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod routes;

pub use config::Settings;
pub use error::ApiError;

use config::LoggingSettings;
use routes::home::DatasetPreview;

/// Application state shared across handlers
pub struct AppState {
    pub pipeline: AttritionPipeline,
    pub settings: Settings,
    /// Head of the historical dataset, if one was loaded
    pub preview: Option<DatasetPreview>,
    /// Prometheus exposition handle; absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(settings: Settings, pipeline: AttritionPipeline) -> Self {
        Self {
            pipeline,
            settings,
            preview: None,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Keep the first `dataset.preview_rows` rows for the home page
    pub fn with_dataset(mut self, dataset: &Dataset) -> Self {
        self.preview = Some(DatasetPreview {
            headers: dataset.headers().to_vec(),
            rows: dataset.head(self.settings.dataset.preview_rows).to_vec(),
        });
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelStatus,
}

/// Loaded model summary
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub kind: &'static str,
    pub n_features: usize,
    pub categorical_fields: Vec<String>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.settings.server.max_upload_bytes;

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/home", get(routes::home::get_home))
        .route("/api/v1/model/performance", get(routes::performance::get_performance))
        .route("/api/v1/predict/form", get(routes::predictions::get_form))
        .route("/api/v1/predict", post(routes::predictions::predict_one))
        .route("/api/v1/predict/batch", post(routes::predictions::predict_batch))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let artifacts = state.pipeline.artifacts();

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelStatus {
            kind: artifacts.model().kind(),
            n_features: artifacts.schema().width(),
            categorical_fields: artifacts.schema().categorical_fields().to_vec(),
        },
    })
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(
    settings: &LoggingSettings,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = settings.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

/// Read the historical dataset; the home page works without it
pub fn load_dataset(settings: &Settings) -> Option<Dataset> {
    match Dataset::from_path(&settings.dataset.path) {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            warn!("Dataset preview unavailable: {}", e);
            None
        }
    }
}

/// Load artifacts and run the server
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let artifacts = ModelArtifacts::load(&settings.artifacts, &settings.schema.categorical_fields)
        .context("failed to load model artifacts")?;
    let pipeline = AttritionPipeline::new(Arc::new(artifacts));

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install metrics recorder")?;

    let dataset = load_dataset(&settings);
    let addr = settings.server.addr.clone();

    let mut state = AppState::new(settings, pipeline).with_metrics(handle);
    if let Some(dataset) = &dataset {
        state = state.with_dataset(dataset);
    }
    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
