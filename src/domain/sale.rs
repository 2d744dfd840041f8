// ==========================================
// Realty Ledger - Sale Domain Model
// ==========================================
// The sale record, its pro-soluto deal terms, the payment
// installments expanded from them, and the commission allocation
// snapshot taken at creation time.
// ==========================================

use crate::domain::types::{BrokerCategory, InstallmentKind, InstallmentStatus, SaleStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// InstallmentGroup - (count, per-installment amount)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstallmentGroup {
    pub count: u32,
    pub amount: f64,
}

// ==========================================
// DownPayment - down-payment mechanism
// ==========================================
// Tagged per mechanism so a lump amount and an installment split
// cannot coexist on one sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownPayment {
    None,
    Lump { amount: f64 },
    Installments { groups: Vec<InstallmentGroup> },
}

impl DownPayment {
    pub fn total(&self) -> f64 {
        match self {
            DownPayment::None => 0.0,
            DownPayment::Lump { amount } => *amount,
            DownPayment::Installments { groups } => groups
                .iter()
                .map(|g| f64::from(g.count) * g.amount)
                .sum(),
        }
    }
}

// ==========================================
// BalloonTerms - balloon-payment state
// ==========================================
// `Pending` records that balloons were agreed but not yet
// configured; no installments are generated for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BalloonTerms {
    None,
    Pending,
    Confirmed { groups: Vec<InstallmentGroup> },
}

impl BalloonTerms {
    pub fn total(&self) -> f64 {
        match self {
            BalloonTerms::Confirmed { groups } => groups
                .iter()
                .map(|g| f64::from(g.count) * g.amount)
                .sum(),
            _ => 0.0,
        }
    }
}

// ==========================================
// DealTerms - pro-soluto financial terms
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealTerms {
    /// Initial good-faith payment at sale time, when agreed.
    pub signal: Option<f64>,
    pub down_payment: DownPayment,
    pub balloon: BalloonTerms,
}

impl DealTerms {
    pub fn none() -> Self {
        Self {
            signal: None,
            down_payment: DownPayment::None,
            balloon: BalloonTerms::None,
        }
    }

    /// Pro-soluto total: signal + down payment + balloons.
    pub fn pro_soluto_total(&self) -> f64 {
        self.signal.unwrap_or(0.0) + self.down_payment.total() + self.balloon.total()
    }
}

// ==========================================
// Sale
// ==========================================
// development_id is None only for sales closed by an independent
// broker. Unit identifiers are free text straight from the source
// spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,

    // ===== References =====
    pub development_id: Option<String>,
    pub broker_id: String,
    pub client_id: Option<String>,

    // ===== Unit identifiers (free text) =====
    pub unit_number: Option<String>,
    pub block: Option<String>,
    pub floor: Option<String>,

    // ===== Deal =====
    pub sale_date: NaiveDate,
    pub sale_price: f64,
    pub broker_category: BrokerCategory, // snapshot at creation
    pub status: SaleStatus,
    pub terms: DealTerms,

    // ===== Computed totals =====
    pub pro_soluto_total: f64,
    /// Total commission percentage / 100.
    pub commission_factor: f64,
    pub total_commission: f64,
    /// The acting broker's own share of the commission.
    pub broker_commission: f64,

    // ===== Audit =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// PaymentInstallment
// ==========================================
// Created in a batch alongside the sale; regenerated (through the
// reconciliation step) when the sale is edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInstallment {
    pub id: String,
    pub sale_id: String,
    pub kind: InstallmentKind,
    /// 1-based running index; None for non-repeating kinds.
    pub installment_no: Option<u32>,
    pub amount: f64,
    /// None only for balloon entries lacking an anchor date.
    pub expected_date: Option<NaiveDate>,
    /// Commission generated for this installment at build time.
    pub commission_amount: f64,
    pub status: InstallmentStatus,
    pub paid_date: Option<NaiveDate>,
    /// Manually overridden paid commission amount, if any.
    pub paid_commission_override: Option<f64>,
}

// ==========================================
// CommissionAllocation
// ==========================================
// Per sale, per role: percentage and computed amount. Immutable
// snapshot at sale-creation time; later role edits never touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionAllocation {
    pub id: String,
    pub sale_id: String,
    pub role_name: String,
    pub percentage: f64,
    pub amount: f64,
}
