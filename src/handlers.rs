//! HTTP handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::explanation::explain;
use crate::features::{derive, RawExpression};
use crate::report::{AnalysisReport, ReportSummary, DISCLAIMER};
use crate::scoring::{score, RiskCategory};
use crate::AppState;

/// Prediction response body. In `simple` mode the score and explanation are
/// omitted from the JSON entirely, not sent as null.
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub analysis_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    pub risk_category: RiskCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub disclaimer: &'static str,
}

fn prediction_response(report: AnalysisReport, simple: bool) -> PredictionResponse {
    let (risk_score, explanation) = if simple {
        (None, None)
    } else {
        (Some(report.risk_score), Some(report.explanation))
    };
    PredictionResponse {
        analysis_id: report.analysis_id,
        timestamp: report.timestamp,
        patient_id: report.patient_id,
        risk_score,
        risk_category: report.risk_category,
        explanation,
        disclaimer: DISCLAIMER,
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "TME risk analysis backend is running" }))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if state.model.is_none() {
        return Err(ApiError::ModelUnavailable {
            reason: "Service unhealthy: model not loaded.".to_string(),
        });
    }
    Ok(Json(json!({ "status": "ok", "model_loaded": true })))
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<RawExpression>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(expression) = payload.map_err(|rejection| ApiError::Validation {
        errors: vec![rejection.body_text()],
    })?;
    expression
        .validate()
        .map_err(|errors| ApiError::Validation { errors })?;

    let model = state.model.as_deref().ok_or_else(|| ApiError::ModelUnavailable {
        reason: "Model not loaded. Check server logs.".to_string(),
    })?;

    let features = derive(&expression);
    let (risk_score, risk_category) = score(model, &features);
    // The stored report always carries the full explanation, whatever the
    // response mode asked for.
    let explanation = explain(&features, model.scaler());

    let report = AnalysisReport {
        analysis_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        patient_id: expression.patient_id.clone(),
        risk_score,
        risk_category,
        explanation,
        mode: expression.mode.clone(),
    };
    state.store.save(&report).await?;

    info!(
        analysis_id = %report.analysis_id,
        risk_category = %report.risk_category,
        "prediction stored"
    );

    Ok(Json(prediction_response(report, expression.is_simple())))
}

pub async fn list_reports(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReportSummary>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(analysis_id): Path<String>,
) -> Result<Json<PredictionResponse>, ApiError> {
    // An id that is not a UUID cannot name a stored report.
    let id = Uuid::parse_str(&analysis_id).map_err(|_| ApiError::ReportNotFound {
        analysis_id: analysis_id.clone(),
    })?;
    let report = state
        .store
        .get(id)
        .await?
        .ok_or(ApiError::ReportNotFound { analysis_id })?;
    Ok(Json(prediction_response(report, false)))
}
