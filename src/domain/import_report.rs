// ==========================================
// Realty Ledger - Batch Run Report Types
// ==========================================
// The structured run log the orchestrator produces. The whole
// report is serde-serializable so callers can export it verbatim
// for audit purposes.
// ==========================================

use crate::domain::types::{BatchState, ImportMode, RowStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// RowReport - per-row detail log entry
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowReport {
    pub row_number: usize,
    pub status: RowStatus,
    /// Human-readable error text; only set for status = error.
    pub error: Option<String>,
    /// Non-fatal findings attached to the row (unresolved client,
    /// future sale date, pro-soluto over price, ambiguous names...).
    pub warnings: Vec<String>,
    /// Id of the created sale; only set for status = success.
    pub sale_id: Option<String>,
}

// ==========================================
// BatchStats
// ==========================================
// `created` counts sales actually persisted — equal to `success`
// in normal runs, zero in dry runs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub success: usize,
    pub error: usize,
    pub duplicate: usize,
    pub created: usize,
}

// ==========================================
// BatchReport
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub mode: ImportMode,
    pub dry_run: bool,
    /// Terminal lifecycle state of the run: completed or cancelled.
    pub state: BatchState,
    pub total_rows: usize,
    /// Rows actually driven through the pipeline (test mode and
    /// cancellation leave the remainder untouched).
    pub processed_rows: usize,
    pub stats: BatchStats,
    pub rows: Vec<RowReport>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// Export the run log verbatim as a JSON document.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ==========================================
// ImportBatchRecord - persisted batch summary
// ==========================================
// One row in the import_batch table per run, with the full report
// attached as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatchRecord {
    pub batch_id: String,
    pub mode: ImportMode,
    pub dry_run: bool,
    pub total_rows: i64,
    pub processed_rows: i64,
    pub success_rows: i64,
    pub error_rows: i64,
    pub duplicate_rows: i64,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub report_json: String,
}

impl ImportBatchRecord {
    pub fn from_report(report: &BatchReport) -> serde_json::Result<Self> {
        Ok(Self {
            batch_id: report.batch_id.clone(),
            mode: report.mode,
            dry_run: report.dry_run,
            total_rows: report.total_rows as i64,
            processed_rows: report.processed_rows as i64,
            success_rows: report.stats.success as i64,
            error_rows: report.stats.error as i64,
            duplicate_rows: report.stats.duplicate as i64,
            cancelled: report.cancelled,
            started_at: report.started_at,
            finished_at: report.finished_at,
            report_json: serde_json::to_string(report)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_roundtrip() {
        let report = BatchReport {
            batch_id: "b1".to_string(),
            mode: ImportMode::Test,
            dry_run: false,
            state: BatchState::Completed,
            total_rows: 12,
            processed_rows: 10,
            stats: BatchStats {
                success: 9,
                error: 0,
                duplicate: 1,
                created: 9,
            },
            rows: vec![RowReport {
                row_number: 1,
                status: RowStatus::Success,
                error: None,
                warnings: vec!["client not found: Maria".to_string()],
                sale_id: Some("s1".to_string()),
            }],
            cancelled: false,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };

        let json = report.to_json().unwrap();
        let back: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.processed_rows, 10);
        assert_eq!(back.stats.duplicate, 1);
        assert_eq!(back.state, BatchState::Completed);
        assert_eq!(back.rows[0].warnings.len(), 1);
    }
}
