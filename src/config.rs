// ==========================================
// Realty Ledger - Import Configuration
// ==========================================
// Tunables for the import pipeline and the commission defaults.
// Serializable so a deployment can keep them in a JSON file next
// to the database.
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Number of data rows a test-mode batch processes.
    pub test_mode_row_limit: usize,
    /// Installment or balloon values below this threshold are
    /// treated as probable column mix-ups and rejected per row.
    pub min_installment_value: f64,
    /// Commission percentage for internal brokers that carry no
    /// personal override.
    pub default_internal_commission_pct: f64,
    /// Commission percentage for external brokers that carry no
    /// personal override.
    pub default_external_commission_pct: f64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            test_mode_row_limit: 10,
            min_installment_value: 100.0,
            default_internal_commission_pct: 2.5,
            default_external_commission_pct: 4.0,
        }
    }
}
