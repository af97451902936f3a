//! Report persistence.
//!
//! Writes are append-only single-row inserts; reads reflect every committed
//! write. The SQLite store is the production backend; the in-memory store
//! backs unit and integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::report::{AnalysisReport, ReportSummary};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("report id already exists")]
    Conflict,
    #[error("stored report is corrupt: {0}")]
    Corrupt(String),
    #[error("internal store error")]
    Internal,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.message().contains("UNIQUE constraint failed") =>
            {
                StoreError::Conflict
            }
            _ => StoreError::Database(err),
        }
    }
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Append one report. The id is caller-generated; a primary-key
    /// collision fails the write.
    async fn save(&self, report: &AnalysisReport) -> Result<(), StoreError>;
    async fn get(&self, analysis_id: Uuid) -> Result<Option<AnalysisReport>, StoreError>;
    /// All summaries, newest timestamp first.
    async fn list(&self) -> Result<Vec<ReportSummary>, StoreError>;
}

/// SQLite-backed store over an sqlx pool.
pub struct SqliteReportStore {
    pool: SqlitePool,
}

impl SqliteReportStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the reports table on a fresh database.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS reports (
                analysis_id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                patient_id TEXT,
                risk_score REAL NOT NULL,
                risk_category TEXT NOT NULL,
                explanation TEXT NOT NULL,
                mode TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(FromRow)]
struct ReportRow {
    analysis_id: String,
    timestamp: DateTime<Utc>,
    patient_id: Option<String>,
    risk_score: f64,
    risk_category: String,
    explanation: String,
    mode: String,
}

impl TryFrom<ReportRow> for AnalysisReport {
    type Error = StoreError;

    fn try_from(row: ReportRow) -> Result<Self, StoreError> {
        Ok(AnalysisReport {
            analysis_id: Uuid::parse_str(&row.analysis_id)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            timestamp: row.timestamp,
            patient_id: row.patient_id,
            risk_score: row.risk_score,
            risk_category: row
                .risk_category
                .parse()
                .map_err(|e: crate::scoring::ParseRiskCategoryError| {
                    StoreError::Corrupt(e.to_string())
                })?,
            explanation: row.explanation,
            mode: row.mode,
        })
    }
}

#[derive(FromRow)]
struct SummaryRow {
    analysis_id: String,
    timestamp: DateTime<Utc>,
    patient_id: Option<String>,
    risk_score: f64,
    risk_category: String,
}

impl TryFrom<SummaryRow> for ReportSummary {
    type Error = StoreError;

    fn try_from(row: SummaryRow) -> Result<Self, StoreError> {
        Ok(ReportSummary {
            analysis_id: Uuid::parse_str(&row.analysis_id)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            timestamp: row.timestamp,
            patient_id: row.patient_id,
            risk_score: row.risk_score,
            risk_category: row
                .risk_category
                .parse()
                .map_err(|e: crate::scoring::ParseRiskCategoryError| {
                    StoreError::Corrupt(e.to_string())
                })?,
        })
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn save(&self, report: &AnalysisReport) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO reports
                (analysis_id, timestamp, patient_id, risk_score, risk_category, explanation, mode)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(report.analysis_id.to_string())
        .bind(report.timestamp)
        .bind(&report.patient_id)
        .bind(report.risk_score)
        .bind(report.risk_category.as_str())
        .bind(&report.explanation)
        .bind(&report.mode)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, analysis_id: Uuid) -> Result<Option<AnalysisReport>, StoreError> {
        let row: Option<ReportRow> = sqlx::query_as(
            "SELECT analysis_id, timestamp, patient_id, risk_score, risk_category, explanation, mode
             FROM reports WHERE analysis_id = ?",
        )
        .bind(analysis_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(AnalysisReport::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            "SELECT analysis_id, timestamp, patient_id, risk_score, risk_category
             FROM reports ORDER BY timestamp DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ReportSummary::try_from).collect()
    }
}

/// In-memory store used by tests.
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: Mutex<HashMap<Uuid, AnalysisReport>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn save(&self, report: &AnalysisReport) -> Result<(), StoreError> {
        let mut reports = self.reports.lock().map_err(|_| StoreError::Internal)?;
        if reports.contains_key(&report.analysis_id) {
            return Err(StoreError::Conflict);
        }
        reports.insert(report.analysis_id, report.clone());
        Ok(())
    }

    async fn get(&self, analysis_id: Uuid) -> Result<Option<AnalysisReport>, StoreError> {
        let reports = self.reports.lock().map_err(|_| StoreError::Internal)?;
        Ok(reports.get(&analysis_id).cloned())
    }

    async fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        let reports = self.reports.lock().map_err(|_| StoreError::Internal)?;
        let mut summaries: Vec<ReportSummary> =
            reports.values().map(AnalysisReport::summary).collect();
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(summaries)
    }
}
