// ==========================================
// Realty Ledger - Unified Sale Engine
// ==========================================
// Single entry point for creating and editing sales. Manual entry
// and batch import both land here, so validation, duplicate
// detection, schedule expansion and commission math cannot diverge
// between the two paths.
// ==========================================

use crate::config::ImportConfig;
use crate::domain::{
    CommissionAllocation, InstallmentStatus, PaymentInstallment, Sale, SaleStatus,
};
use crate::engine::commission;
use crate::engine::duplicate;
use crate::engine::schedule::{self, InstallmentDraft};
use crate::engine::SaleDraft;
use crate::repository::{LedgerStore, RepositoryError};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

// ==========================================
// Error type
// ==========================================
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== Referential failures =====
    #[error("broker not found: {0}")]
    BrokerNotFound(String),
    #[error("development not found: {0}")]
    DevelopmentNotFound(String),
    #[error("sale not found: {0}")]
    SaleNotFound(String),

    // ===== Validation failures =====
    #[error("invalid sale draft: {0}")]
    InvalidDraft(String),

    // ===== Storage failures =====
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Outcome of a create attempt.
#[derive(Debug, Clone)]
pub enum SaleCreation {
    Created { sale_id: String },
    Duplicate { existing_sale_id: String },
}

/// Outcome of an edit. `needs_review` lists previously paid
/// installments whose slot no longer exists in the new schedule.
#[derive(Debug, Clone)]
pub struct SaleUpdate {
    pub sale_id: String,
    pub needs_review: Vec<PaymentInstallment>,
}

/// A fully derived sale ready to persist: the record itself plus
/// its commission allocations and payment schedule.
#[derive(Debug, Clone)]
pub struct AssembledSale {
    pub sale: Sale,
    pub allocations: Vec<CommissionAllocation>,
    pub installments: Vec<PaymentInstallment>,
}

// ==========================================
// SaleEngine
// ==========================================
pub struct SaleEngine {
    store: Arc<dyn LedgerStore>,
    config: ImportConfig,
}

impl SaleEngine {
    pub fn new(store: Arc<dyn LedgerStore>, config: ImportConfig) -> Self {
        Self { store, config }
    }

    /// Derive the full sale record from a draft without touching
    /// storage (beyond registry reads). Dry-run imports use this
    /// directly; create/update build on it.
    pub async fn assemble(&self, draft: &SaleDraft) -> Result<AssembledSale, EngineError> {
        self.assemble_as(&Uuid::new_v4().to_string(), draft).await
    }

    async fn assemble_as(
        &self,
        sale_id: &str,
        draft: &SaleDraft,
    ) -> Result<AssembledSale, EngineError> {
        if draft.sale_price <= 0.0 {
            return Err(EngineError::InvalidDraft(format!(
                "sale price must be positive, got {}",
                draft.sale_price
            )));
        }

        let broker = self
            .store
            .get_broker(&draft.broker_id)
            .await?
            .ok_or_else(|| EngineError::BrokerNotFound(draft.broker_id.clone()))?;

        let development = match &draft.development_id {
            Some(id) => Some(
                self.store
                    .get_development(id)
                    .await?
                    .ok_or_else(|| EngineError::DevelopmentNotFound(id.clone()))?,
            ),
            None => None,
        };

        let roles = commission::applicable_roles(development.as_ref(), &broker, &self.config);
        let factor = commission::commission_factor(&roles);
        let total = commission::total_commission(draft.sale_price, &roles);
        let own = commission::broker_own_commission(draft.sale_price, &roles, &broker, &self.config);

        let now = Utc::now();
        let sale = Sale {
            id: sale_id.to_string(),
            development_id: draft.development_id.clone(),
            broker_id: draft.broker_id.clone(),
            client_id: draft.client_id.clone(),
            unit_number: draft.unit_number.clone(),
            block: draft.block.clone(),
            floor: draft.floor.clone(),
            sale_date: draft.sale_date,
            sale_price: draft.sale_price,
            broker_category: broker.category,
            status: draft.status,
            terms: draft.terms.clone(),
            pro_soluto_total: draft.terms.pro_soluto_total(),
            commission_factor: factor,
            total_commission: total,
            broker_commission: own,
            created_at: now,
            updated_at: now,
        };

        let allocations = commission::build_allocations(sale_id, draft.sale_price, &roles);
        let installments = schedule::build_schedule(draft.sale_date, &draft.terms)
            .into_iter()
            .map(|d| materialize(sale_id, factor, d))
            .collect();

        debug!(
            sale_id,
            factor,
            total_commission = total,
            "sale assembled"
        );

        Ok(AssembledSale {
            sale,
            allocations,
            installments,
        })
    }

    /// Create a sale, or report the existing duplicate.
    pub async fn create_sale(&self, draft: SaleDraft) -> Result<SaleCreation, EngineError> {
        let candidates = self
            .store
            .find_duplicate_candidates(
                draft.development_id.as_deref(),
                draft.client_id.as_deref(),
                &draft.broker_id,
                draft.sale_date,
            )
            .await?;

        if let Some(existing) = duplicate::find_duplicate(&draft, &candidates) {
            info!(existing_sale_id = %existing.id, "duplicate sale rejected");
            return Ok(SaleCreation::Duplicate {
                existing_sale_id: existing.id.clone(),
            });
        }

        let assembled = self.assemble(&draft).await?;
        let sale_id = assembled.sale.id.clone();

        self.store
            .create_sale_with_schedule(
                assembled.sale,
                assembled.allocations,
                assembled.installments,
            )
            .await?;

        info!(sale_id = %sale_id, "sale created");
        Ok(SaleCreation::Created { sale_id })
    }

    /// Re-derive a sale from an edited draft. The payment schedule
    /// is rebuilt and reconciled against the stored one so that
    /// unchanged paid installments keep their history.
    pub async fn update_sale(
        &self,
        sale_id: &str,
        draft: SaleDraft,
    ) -> Result<SaleUpdate, EngineError> {
        let existing = self
            .store
            .get_sale(sale_id)
            .await?
            .ok_or_else(|| EngineError::SaleNotFound(sale_id.to_string()))?;

        let old_installments = self.store.list_installments_by_sale(sale_id).await?;

        let mut assembled = self.assemble_as(sale_id, &draft).await?;
        assembled.sale.created_at = existing.created_at;
        assembled.sale.updated_at = Utc::now();

        let reconciled = schedule::reconcile_schedule(&old_installments, assembled.installments);

        // A sale with paid installments never drops back to pending.
        if assembled.sale.status == SaleStatus::Pending
            && reconciled
                .installments
                .iter()
                .any(|i| i.status == InstallmentStatus::Paid)
        {
            assembled.sale.status = SaleStatus::InProgress;
        }

        self.store
            .update_sale_with_schedule(
                assembled.sale,
                assembled.allocations,
                reconciled.installments,
            )
            .await?;

        info!(
            sale_id,
            needs_review = reconciled.needs_review.len(),
            "sale updated"
        );
        Ok(SaleUpdate {
            sale_id: sale_id.to_string(),
            needs_review: reconciled.needs_review,
        })
    }
}

fn materialize(sale_id: &str, factor: f64, draft: InstallmentDraft) -> PaymentInstallment {
    PaymentInstallment {
        id: Uuid::new_v4().to_string(),
        sale_id: sale_id.to_string(),
        kind: draft.kind,
        installment_no: draft.installment_no,
        amount: draft.amount,
        expected_date: draft.expected_date,
        commission_amount: commission::installment_commission(draft.amount, factor),
        status: InstallmentStatus::Pending,
        paid_date: None,
        paid_commission_override: None,
    }
}
