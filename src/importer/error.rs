// ==========================================
// Realty Ledger - Import Error Type
// ==========================================
// Batch-level failures abort the run before any row is processed;
// row-level failures are caught by the orchestrator and logged on
// the row report, never aborting the batch.
// ==========================================

use crate::engine::EngineError;
use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== Batch-level: file access and shape =====
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read file: {0}")]
    FileReadError(String),
    #[error("excel parse error: {0}")]
    ExcelParseError(String),
    #[error("csv parse error: {0}")]
    CsvParseError(String),
    #[error("missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    // ===== Row-level: field extraction =====
    #[error("row {row}: missing {field}")]
    MissingField { row: usize, field: String },
    #[error("row {row}: unknown development '{name}'")]
    UnknownDevelopment { row: usize, name: String },
    #[error("row {row}: unknown broker '{name}'")]
    UnknownBroker { row: usize, name: String },
    #[error("row {row}: unparseable sale date '{value}'")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: invalid sale price '{value}'")]
    InvalidPrice { row: usize, value: String },
    #[error("row {row}: invalid {field} '{value}'")]
    InvalidAmount {
        row: usize,
        field: String,
        value: String,
    },
    #[error("row {row}: inconsistent installment terms: {message}")]
    InconsistentInstallments { row: usize, message: String },
    #[error(
        "row {row}: installment value {value} below minimum {min}, probable column mix-up"
    )]
    SuspiciousInstallmentValue { row: usize, value: f64, min: f64 },

    // ===== Wrapped lower layers =====
    #[error("report serialization failed: {0}")]
    ReportSerialization(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}
