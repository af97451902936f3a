//! Request-level error taxonomy and its HTTP mapping.
//!
//! Every failure surfaces: validation as 400 with per-field messages, a
//! missing model as 503, unknown reports as 404, and anything that breaks
//! mid-pipeline as 500 with a generic client message and full detail in the
//! server log. Nothing is retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation { errors: Vec<String> },
    #[error("model unavailable: {reason}")]
    ModelUnavailable { reason: String },
    #[error("report {analysis_id} not found")]
    ReportNotFound { analysis_id: String },
    #[error("storage failure")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { errors } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Validation Error", "errors": errors })),
            )
                .into_response(),
            ApiError::ModelUnavailable { reason } => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": reason })),
            )
                .into_response(),
            ApiError::ReportNotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Report not found" })),
            )
                .into_response(),
            ApiError::Store(err) => {
                // Full detail stays server-side.
                tracing::error!(error = %err, "storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Database error" })),
                )
                    .into_response()
            }
        }
    }
}
