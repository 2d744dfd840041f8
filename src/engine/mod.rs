// ==========================================
// Realty Ledger - Sale Engine Layer
// ==========================================
// Pure calculators (duplicate detection, schedule expansion,
// commission math) plus the unified engine that drives storage.
// ==========================================

pub mod commission;
pub mod duplicate;
pub mod sale_engine;
pub mod schedule;

pub use sale_engine::{AssembledSale, EngineError, SaleCreation, SaleEngine, SaleUpdate};
pub use schedule::{build_schedule, reconcile_schedule, InstallmentDraft, ReconciledSchedule};

use crate::domain::{DealTerms, SaleStatus};
use chrono::NaiveDate;

// ==========================================
// SaleDraft - input to the engine
// ==========================================
// References are already resolved to registry ids; raw-name
// resolution happens upstream in the importer (or in the UI for
// manual entry).
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub development_id: Option<String>,
    pub broker_id: String,
    pub client_id: Option<String>,
    pub unit_number: Option<String>,
    pub block: Option<String>,
    pub floor: Option<String>,
    pub sale_date: NaiveDate,
    pub sale_price: f64,
    pub status: SaleStatus,
    pub terms: DealTerms,
}
