// ==========================================
// Realty Ledger - Import Pipeline
// ==========================================

pub mod batch_importer;
pub mod error;
pub mod row_mapper;

pub use batch_importer::{BatchImporter, CancelToken, ImportOptions};
pub use error::ImportError;
pub use row_mapper::{map_rows, RawSaleRow};
