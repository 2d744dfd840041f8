// ==========================================
// Realty Ledger - Domain Layer
// ==========================================
// Entities and value types. No I/O, no SQL, no business rules
// beyond structural invariants.
// ==========================================

pub mod import_report;
pub mod registry;
pub mod sale;
pub mod types;

// Re-export core entities
pub use import_report::{BatchReport, BatchStats, ImportBatchRecord, RowReport};
pub use registry::{Broker, Client, Development, Role};
pub use sale::{
    BalloonTerms, CommissionAllocation, DealTerms, DownPayment, InstallmentGroup,
    PaymentInstallment, Sale,
};
pub use types::{
    BatchState, BrokerCategory, ImportMode, InstallmentKind, InstallmentStatus, RowStatus,
    SaleStatus,
};
