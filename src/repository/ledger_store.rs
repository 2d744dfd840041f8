// ==========================================
// Realty Ledger - Storage Trait
// ==========================================
// The engine and the importer talk to storage through this trait
// only; the SQLite implementation lives in sqlite_store.rs.
// ==========================================

use crate::domain::{
    Broker, Client, CommissionAllocation, Development, ImportBatchRecord, PaymentInstallment, Sale,
};
use crate::repository::error::RepositoryError;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ===== Registries =====
    async fn insert_development(&self, development: &Development) -> Result<(), RepositoryError>;
    async fn get_development(&self, id: &str) -> Result<Option<Development>, RepositoryError>;
    async fn list_developments(&self) -> Result<Vec<Development>, RepositoryError>;

    async fn insert_broker(&self, broker: &Broker) -> Result<(), RepositoryError>;
    async fn get_broker(&self, id: &str) -> Result<Option<Broker>, RepositoryError>;
    async fn list_brokers(&self) -> Result<Vec<Broker>, RepositoryError>;

    async fn insert_client(&self, client: &Client) -> Result<(), RepositoryError>;
    async fn get_client(&self, id: &str) -> Result<Option<Client>, RepositoryError>;
    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError>;

    // ===== Sales =====
    /// Sales sharing the duplicate base key (development, client,
    /// broker, sale date). Unit-level narrowing happens in the
    /// engine, not in SQL.
    async fn find_duplicate_candidates(
        &self,
        development_id: Option<&str>,
        client_id: Option<&str>,
        broker_id: &str,
        sale_date: NaiveDate,
    ) -> Result<Vec<Sale>, RepositoryError>;

    /// Insert a sale with its allocations and schedule in one
    /// transaction.
    async fn create_sale_with_schedule(
        &self,
        sale: Sale,
        allocations: Vec<CommissionAllocation>,
        installments: Vec<PaymentInstallment>,
    ) -> Result<(), RepositoryError>;

    /// Replace a sale's record, allocations and schedule in one
    /// transaction. The installments passed in already carry any
    /// payment history reconciled by the engine.
    async fn update_sale_with_schedule(
        &self,
        sale: Sale,
        allocations: Vec<CommissionAllocation>,
        installments: Vec<PaymentInstallment>,
    ) -> Result<(), RepositoryError>;

    async fn get_sale(&self, id: &str) -> Result<Option<Sale>, RepositoryError>;
    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError>;
    async fn delete_sale(&self, id: &str) -> Result<(), RepositoryError>;

    // ===== Schedule and allocations =====
    async fn list_installments_by_sale(
        &self,
        sale_id: &str,
    ) -> Result<Vec<PaymentInstallment>, RepositoryError>;

    async fn list_allocations_by_sale(
        &self,
        sale_id: &str,
    ) -> Result<Vec<CommissionAllocation>, RepositoryError>;

    /// Mark one installment paid, optionally overriding the
    /// commission actually paid out.
    async fn mark_installment_paid(
        &self,
        installment_id: &str,
        paid_date: NaiveDate,
        commission_override: Option<f64>,
    ) -> Result<(), RepositoryError>;

    // ===== Import batches =====
    async fn insert_import_batch(&self, record: &ImportBatchRecord) -> Result<(), RepositoryError>;
    async fn list_import_batches(&self) -> Result<Vec<ImportBatchRecord>, RepositoryError>;
}
