// ==========================================
// Realty Ledger - Core Library
// ==========================================
// Sales ledger import and commission reconciliation for
// real-estate developments: spreadsheet ingestion, fuzzy entity
// resolution, pro-soluto schedule expansion and role-based
// commission splits over SQLite.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Storage layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Import layer - external data
pub mod importer;

// Field parsers - locale-tolerant cell parsing
pub mod parsers;

// Entity resolver - fuzzy name matching
pub mod resolver;

// Configuration
pub mod config;

// Database infrastructure (connection init / unified PRAGMAs)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Core type re-exports
// ==========================================

// Domain types
pub use domain::{
    BrokerCategory, ImportMode, InstallmentKind, InstallmentStatus, RowStatus, SaleStatus,
};

// Domain entities
pub use domain::{
    BalloonTerms, BatchReport, Broker, Client, CommissionAllocation, DealTerms, Development,
    DownPayment, InstallmentGroup, PaymentInstallment, Role, Sale,
};

// Engine
pub use engine::{SaleCreation, SaleDraft, SaleEngine, SaleUpdate};

// Import pipeline
pub use importer::{BatchImporter, CancelToken, ImportError, ImportOptions};

// Storage
pub use repository::{LedgerStore, RepositoryError, SqliteLedgerStore};

// Configuration
pub use config::ImportConfig;

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "Realty Ledger";
