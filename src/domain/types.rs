// ==========================================
// Realty Ledger - Domain Type Definitions
// ==========================================
// Enum vocabulary shared by every layer.
// Serialization format: snake_case (matches database columns)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Broker Category
// ==========================================
// Snapshot on the sale at creation time; also the filter
// applied to a development's role table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerCategory {
    External,
    Internal,
}

impl fmt::Display for BrokerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerCategory::External => write!(f, "external"),
            BrokerCategory::Internal => write!(f, "internal"),
        }
    }
}

impl BrokerCategory {
    /// Parse the database representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "external" => Some(BrokerCategory::External),
            "internal" => Some(BrokerCategory::Internal),
            _ => None,
        }
    }
}

// ==========================================
// Sale Status
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    InProgress,
    Paid,
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleStatus::Pending => write!(f, "pending"),
            SaleStatus::InProgress => write!(f, "in_progress"),
            SaleStatus::Paid => write!(f, "paid"),
        }
    }
}

impl SaleStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "pending" => Some(SaleStatus::Pending),
            "in_progress" => Some(SaleStatus::InProgress),
            "paid" => Some(SaleStatus::Paid),
            _ => None,
        }
    }
}

// ==========================================
// Installment Kind
// ==========================================
// Signal and a lump down payment occur once; split down payments
// and balloons carry a 1-based installment number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentKind {
    Signal,
    DownPayment,
    DownPaymentInstallment,
    Balloon,
}

impl fmt::Display for InstallmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallmentKind::Signal => write!(f, "signal"),
            InstallmentKind::DownPayment => write!(f, "down_payment"),
            InstallmentKind::DownPaymentInstallment => write!(f, "down_payment_installment"),
            InstallmentKind::Balloon => write!(f, "balloon"),
        }
    }
}

impl InstallmentKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "signal" => Some(InstallmentKind::Signal),
            "down_payment" => Some(InstallmentKind::DownPayment),
            "down_payment_installment" => Some(InstallmentKind::DownPaymentInstallment),
            "balloon" => Some(InstallmentKind::Balloon),
            _ => None,
        }
    }
}

// ==========================================
// Installment Status
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Pending,
    Paid,
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallmentStatus::Pending => write!(f, "pending"),
            InstallmentStatus::Paid => write!(f, "paid"),
        }
    }
}

impl InstallmentStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "pending" => Some(InstallmentStatus::Pending),
            "paid" => Some(InstallmentStatus::Paid),
            _ => None,
        }
    }
}

// ==========================================
// Import Mode
// ==========================================
// Test mode caps processing at the first rows of the batch so an
// operator can sanity-check the column mapping before a full run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    Test,
    Full,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Test => write!(f, "test"),
            ImportMode::Full => write!(f, "full"),
        }
    }
}

impl ImportMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "test" => Some(ImportMode::Test),
            "full" => Some(ImportMode::Full),
            _ => None,
        }
    }
}

// ==========================================
// Row Status
// ==========================================
// Terminal state of one imported row. Duplicate is deliberately
// neither success nor error; it gets its own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Success,
    Error,
    Duplicate,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Success => write!(f, "success"),
            RowStatus::Error => write!(f, "error"),
            RowStatus::Duplicate => write!(f, "duplicate"),
        }
    }
}

// ==========================================
// Batch State
// ==========================================
// idle → running → (completed | cancelled)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchState::Idle => write!(f, "idle"),
            BatchState::Running => write!(f, "running"),
            BatchState::Completed => write!(f, "completed"),
            BatchState::Cancelled => write!(f, "cancelled"),
        }
    }
}
