//! API Error Responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dataset::DatasetError;
use inference_engine::{InferenceError, PipelineError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("{0}")]
    BadRequest(String),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(
                PipelineError::SchemaMismatch { .. } | PipelineError::MissingValues { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Dataset(DatasetError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Dataset(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Pipeline(PipelineError::SchemaMismatch { .. }) => "schema_mismatch",
            ApiError::Pipeline(PipelineError::MissingValues { .. }) => "missing_values",
            ApiError::Pipeline(PipelineError::Inference(InferenceError::InvalidProbability(_))) => {
                "invalid_probability"
            }
            ApiError::Pipeline(_) => "inference_failed",
            ApiError::Dataset(DatasetError::UnsupportedFormat(_)) => "unsupported_format",
            ApiError::Dataset(_) => "invalid_dataset",
            ApiError::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let mismatch = ApiError::from(PipelineError::SchemaMismatch {
            stage: "scaler",
            expected: 10,
            actual: 9,
        });
        assert_eq!(mismatch.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(mismatch.code(), "schema_mismatch");

        let missing = ApiError::from(PipelineError::MissingValues {
            columns: vec!["MonthlyIncome".to_string()],
        });
        assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(missing.code(), "missing_values");

        let invalid = ApiError::from(PipelineError::Inference(
            InferenceError::InvalidProbability(f64::NAN),
        ));
        assert_eq!(invalid.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(invalid.code(), "invalid_probability");

        let format = ApiError::from(DatasetError::UnsupportedFormat("a.xlsx".into()));
        assert_eq!(format.status(), StatusCode::BAD_REQUEST);
        assert_eq!(format.code(), "unsupported_format");

        assert_eq!(
            ApiError::Dataset(DatasetError::MissingHeader).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
