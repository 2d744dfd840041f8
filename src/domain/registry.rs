// ==========================================
// Realty Ledger - Registry Entities
// ==========================================
// Canonical entities the import pipeline resolves fuzzy names
// against: developments (with their commission role tables),
// brokers and clients.
// ==========================================

use crate::domain::types::BrokerCategory;
use serde::{Deserialize, Serialize};

// ==========================================
// Role - named commission share
// ==========================================
// A named share of the total commission percentage within a
// development, tagged with the broker category it applies to.
// Percentages for a category need not sum to 100 (they typically do).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub category: BrokerCategory,
    pub percentage: f64, // >= 0
}

// ==========================================
// Development - sales project
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Development {
    pub id: String,
    pub name: String,
    pub roles: Vec<Role>,
}

impl Development {
    /// Roles applicable to a broker of the given category.
    pub fn roles_for_category(&self, category: BrokerCategory) -> Vec<Role> {
        self.roles
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect()
    }
}

// ==========================================
// Broker
// ==========================================
// A broker is either linked to exactly one Development+Role, or
// independent with a flat personal percentage; never both. The
// link is expressed by development_id/role_name being set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broker {
    pub id: String,
    pub name: String,
    pub category: BrokerCategory,
    /// Flat personal commission percentage. Only consulted when the
    /// broker is independent (no development link).
    pub personal_commission_pct: Option<f64>,
    pub development_id: Option<String>,
    pub role_name: Option<String>,
}

impl Broker {
    pub fn is_independent(&self) -> bool {
        self.development_id.is_none()
    }
}

// ==========================================
// Client
// ==========================================
// Clients are looked up, never required: a sale may have no client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub full_name: String,
    pub tax_id: Option<String>,
}
