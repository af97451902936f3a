//! Persisted analysis records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::RiskCategory;

/// Attached to every response body; a process constant, never persisted.
pub const DISCLAIMER: &str = "This output is intended for research and clinical decision support only and should not be used as a standalone diagnostic or treatment decision tool.";

/// One completed prediction. Written exactly once, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub patient_id: Option<String>,
    /// High-risk probability in [0, 1].
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    /// Narrative rationale; empty is valid.
    pub explanation: String,
    /// Response mode as submitted, recognized or not.
    pub mode: String,
}

/// Listing view of a report; omits the explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub analysis_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub patient_id: Option<String>,
    pub risk_score: f64,
    pub risk_category: RiskCategory,
}

impl AnalysisReport {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            analysis_id: self.analysis_id,
            timestamp: self.timestamp,
            patient_id: self.patient_id.clone(),
            risk_score: self.risk_score,
            risk_category: self.risk_category,
        }
    }
}
