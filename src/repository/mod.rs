// ==========================================
// Realty Ledger - Storage Layer
// ==========================================

pub mod error;
pub mod ledger_store;
pub mod sqlite_store;

pub use error::RepositoryError;
pub use ledger_store::LedgerStore;
pub use sqlite_store::SqliteLedgerStore;
