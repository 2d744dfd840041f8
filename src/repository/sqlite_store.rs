// ==========================================
// Realty Ledger - SQLite Store
// ==========================================
// LedgerStore implementation over a shared rusqlite connection.
// Deal terms persist as a JSON column; enum columns store the
// snake_case text form and are parsed back on read, with parse
// failures surfaced as data corruption instead of silent defaults.
// ==========================================

use crate::db;
use crate::domain::{
    Broker, BrokerCategory, Client, CommissionAllocation, Development, ImportBatchRecord,
    ImportMode, InstallmentKind, InstallmentStatus, PaymentInstallment, Role, Sale, SaleStatus,
};
use crate::repository::error::RepositoryError;
use crate::repository::ledger_store::LedgerStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS development (
    id   TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS development_role (
    development_id TEXT NOT NULL REFERENCES development(id) ON DELETE CASCADE,
    name           TEXT NOT NULL,
    category       TEXT NOT NULL,
    percentage     REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_role_development ON development_role(development_id);

CREATE TABLE IF NOT EXISTS broker (
    id                      TEXT PRIMARY KEY,
    name                    TEXT NOT NULL,
    category                TEXT NOT NULL,
    personal_commission_pct REAL,
    development_id          TEXT REFERENCES development(id),
    role_name               TEXT
);

CREATE TABLE IF NOT EXISTS client (
    id        TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    tax_id    TEXT
);

CREATE TABLE IF NOT EXISTS sale (
    id                TEXT PRIMARY KEY,
    development_id    TEXT REFERENCES development(id),
    broker_id         TEXT NOT NULL REFERENCES broker(id),
    client_id         TEXT REFERENCES client(id),
    unit_number       TEXT,
    block             TEXT,
    floor             TEXT,
    sale_date         TEXT NOT NULL,
    sale_price        REAL NOT NULL,
    broker_category   TEXT NOT NULL,
    status            TEXT NOT NULL,
    terms_json        TEXT NOT NULL,
    pro_soluto_total  REAL NOT NULL,
    commission_factor REAL NOT NULL,
    total_commission  REAL NOT NULL,
    broker_commission REAL NOT NULL,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sale_dup_key ON sale(broker_id, sale_date);

CREATE TABLE IF NOT EXISTS payment_installment (
    id                       TEXT PRIMARY KEY,
    sale_id                  TEXT NOT NULL REFERENCES sale(id) ON DELETE CASCADE,
    kind                     TEXT NOT NULL,
    installment_no           INTEGER,
    amount                   REAL NOT NULL,
    expected_date            TEXT,
    commission_amount        REAL NOT NULL,
    status                   TEXT NOT NULL,
    paid_date                TEXT,
    paid_commission_override REAL
);
CREATE INDEX IF NOT EXISTS idx_installment_sale ON payment_installment(sale_id);

CREATE TABLE IF NOT EXISTS commission_allocation (
    id         TEXT PRIMARY KEY,
    sale_id    TEXT NOT NULL REFERENCES sale(id) ON DELETE CASCADE,
    role_name  TEXT NOT NULL,
    percentage REAL NOT NULL,
    amount     REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_allocation_sale ON commission_allocation(sale_id);

CREATE TABLE IF NOT EXISTS import_batch (
    batch_id       TEXT PRIMARY KEY,
    mode           TEXT NOT NULL,
    dry_run        INTEGER NOT NULL,
    total_rows     INTEGER NOT NULL,
    processed_rows INTEGER NOT NULL,
    success_rows   INTEGER NOT NULL,
    error_rows     INTEGER NOT NULL,
    duplicate_rows INTEGER NOT NULL,
    cancelled      INTEGER NOT NULL,
    started_at     TEXT NOT NULL,
    finished_at    TEXT NOT NULL,
    report_json    TEXT NOT NULL
);
"#;

// ==========================================
// SqliteLedgerStore
// ==========================================
pub struct SqliteLedgerStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedgerStore {
    /// Open the database, apply the unified PRAGMAs and create any
    /// missing tables.
    pub fn open(db_path: &str) -> Result<Self, RepositoryError> {
        let conn = db::open_sqlite_connection(db_path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Database("connection lock poisoned".to_string()))
    }
}

// ==========================================
// Raw row shapes
// ==========================================
// Enum/JSON columns come out as plain strings inside query_map;
// parsing into domain types happens afterwards so a bad value maps
// to DataCorruption rather than a generic rusqlite error.
struct SaleRow {
    id: String,
    development_id: Option<String>,
    broker_id: String,
    client_id: Option<String>,
    unit_number: Option<String>,
    block: Option<String>,
    floor: Option<String>,
    sale_date: NaiveDate,
    sale_price: f64,
    broker_category: String,
    status: String,
    terms_json: String,
    pro_soluto_total: f64,
    commission_factor: f64,
    total_commission: f64,
    broker_commission: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const SALE_COLUMNS: &str = "id, development_id, broker_id, client_id, unit_number, block, floor, \
     sale_date, sale_price, broker_category, status, terms_json, pro_soluto_total, \
     commission_factor, total_commission, broker_commission, created_at, updated_at";

fn read_sale_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SaleRow> {
    Ok(SaleRow {
        id: row.get(0)?,
        development_id: row.get(1)?,
        broker_id: row.get(2)?,
        client_id: row.get(3)?,
        unit_number: row.get(4)?,
        block: row.get(5)?,
        floor: row.get(6)?,
        sale_date: row.get(7)?,
        sale_price: row.get(8)?,
        broker_category: row.get(9)?,
        status: row.get(10)?,
        terms_json: row.get(11)?,
        pro_soluto_total: row.get(12)?,
        commission_factor: row.get(13)?,
        total_commission: row.get(14)?,
        broker_commission: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

fn parse_sale(raw: SaleRow) -> Result<Sale, RepositoryError> {
    let broker_category = BrokerCategory::parse(&raw.broker_category).ok_or_else(|| {
        RepositoryError::DataCorruption(format!(
            "sale {}: unknown broker category '{}'",
            raw.id, raw.broker_category
        ))
    })?;
    let status = SaleStatus::parse(&raw.status).ok_or_else(|| {
        RepositoryError::DataCorruption(format!(
            "sale {}: unknown status '{}'",
            raw.id, raw.status
        ))
    })?;
    let terms = serde_json::from_str(&raw.terms_json).map_err(|e| {
        RepositoryError::DataCorruption(format!("sale {}: bad terms json: {}", raw.id, e))
    })?;

    Ok(Sale {
        id: raw.id,
        development_id: raw.development_id,
        broker_id: raw.broker_id,
        client_id: raw.client_id,
        unit_number: raw.unit_number,
        block: raw.block,
        floor: raw.floor,
        sale_date: raw.sale_date,
        sale_price: raw.sale_price,
        broker_category,
        status,
        terms,
        pro_soluto_total: raw.pro_soluto_total,
        commission_factor: raw.commission_factor,
        total_commission: raw.total_commission,
        broker_commission: raw.broker_commission,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}

struct InstallmentRow {
    id: String,
    sale_id: String,
    kind: String,
    installment_no: Option<u32>,
    amount: f64,
    expected_date: Option<NaiveDate>,
    commission_amount: f64,
    status: String,
    paid_date: Option<NaiveDate>,
    paid_commission_override: Option<f64>,
}

fn parse_installment(raw: InstallmentRow) -> Result<PaymentInstallment, RepositoryError> {
    let kind = InstallmentKind::parse(&raw.kind).ok_or_else(|| {
        RepositoryError::DataCorruption(format!(
            "installment {}: unknown kind '{}'",
            raw.id, raw.kind
        ))
    })?;
    let status = InstallmentStatus::parse(&raw.status).ok_or_else(|| {
        RepositoryError::DataCorruption(format!(
            "installment {}: unknown status '{}'",
            raw.id, raw.status
        ))
    })?;

    Ok(PaymentInstallment {
        id: raw.id,
        sale_id: raw.sale_id,
        kind,
        installment_no: raw.installment_no,
        amount: raw.amount,
        expected_date: raw.expected_date,
        commission_amount: raw.commission_amount,
        status,
        paid_date: raw.paid_date,
        paid_commission_override: raw.paid_commission_override,
    })
}

// ==========================================
// Row writers shared by create and update
// ==========================================
fn insert_sale_row(conn: &Connection, sale: &Sale) -> Result<(), RepositoryError> {
    let terms_json = serde_json::to_string(&sale.terms)?;
    conn.execute(
        "INSERT INTO sale (id, development_id, broker_id, client_id, unit_number, block, floor, \
         sale_date, sale_price, broker_category, status, terms_json, pro_soluto_total, \
         commission_factor, total_commission, broker_commission, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            sale.id,
            sale.development_id,
            sale.broker_id,
            sale.client_id,
            sale.unit_number,
            sale.block,
            sale.floor,
            sale.sale_date,
            sale.sale_price,
            sale.broker_category.to_string(),
            sale.status.to_string(),
            terms_json,
            sale.pro_soluto_total,
            sale.commission_factor,
            sale.total_commission,
            sale.broker_commission,
            sale.created_at,
            sale.updated_at,
        ],
    )?;
    Ok(())
}

fn insert_schedule_rows(
    conn: &Connection,
    allocations: &[CommissionAllocation],
    installments: &[PaymentInstallment],
) -> Result<(), RepositoryError> {
    for allocation in allocations {
        conn.execute(
            "INSERT INTO commission_allocation (id, sale_id, role_name, percentage, amount) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                allocation.id,
                allocation.sale_id,
                allocation.role_name,
                allocation.percentage,
                allocation.amount,
            ],
        )?;
    }

    for installment in installments {
        conn.execute(
            "INSERT INTO payment_installment (id, sale_id, kind, installment_no, amount, \
             expected_date, commission_amount, status, paid_date, paid_commission_override) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                installment.id,
                installment.sale_id,
                installment.kind.to_string(),
                installment.installment_no,
                installment.amount,
                installment.expected_date,
                installment.commission_amount,
                installment.status.to_string(),
                installment.paid_date,
                installment.paid_commission_override,
            ],
        )?;
    }
    Ok(())
}

fn load_roles(conn: &Connection, development_id: &str) -> Result<Vec<Role>, RepositoryError> {
    let mut stmt = conn.prepare(
        "SELECT name, category, percentage FROM development_role WHERE development_id = ?1",
    )?;
    let raw: Vec<(String, String, f64)> = stmt
        .query_map(params![development_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<rusqlite::Result<_>>()?;

    raw.into_iter()
        .map(|(name, category, percentage)| {
            let category = BrokerCategory::parse(&category).ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "role '{}': unknown category '{}'",
                    name, category
                ))
            })?;
            Ok(Role {
                name,
                category,
                percentage,
            })
        })
        .collect()
}

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    // ===== Registries =====

    async fn insert_development(&self, development: &Development) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO development (id, name) VALUES (?1, ?2)",
            params![development.id, development.name],
        )?;
        for role in &development.roles {
            tx.execute(
                "INSERT INTO development_role (development_id, name, category, percentage) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    development.id,
                    role.name,
                    role.category.to_string(),
                    role.percentage
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn get_development(&self, id: &str) -> Result<Option<Development>, RepositoryError> {
        let conn = self.lock()?;
        let base: Option<(String, String)> = conn
            .query_row(
                "SELECT id, name FROM development WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match base {
            Some((id, name)) => {
                let roles = load_roles(&conn, &id)?;
                Ok(Some(Development { id, name, roles }))
            }
            None => Ok(None),
        }
    }

    async fn list_developments(&self) -> Result<Vec<Development>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name FROM development ORDER BY name")?;
        let base: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;

        base.into_iter()
            .map(|(id, name)| {
                let roles = load_roles(&conn, &id)?;
                Ok(Development { id, name, roles })
            })
            .collect()
    }

    async fn insert_broker(&self, broker: &Broker) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO broker (id, name, category, personal_commission_pct, development_id, \
             role_name) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                broker.id,
                broker.name,
                broker.category.to_string(),
                broker.personal_commission_pct,
                broker.development_id,
                broker.role_name,
            ],
        )?;
        Ok(())
    }

    async fn get_broker(&self, id: &str) -> Result<Option<Broker>, RepositoryError> {
        let conn = self.lock()?;
        let raw: Option<(String, String, String, Option<f64>, Option<String>, Option<String>)> =
            conn.query_row(
                "SELECT id, name, category, personal_commission_pct, development_id, role_name \
                 FROM broker WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        raw.map(parse_broker).transpose()
    }

    async fn list_brokers(&self) -> Result<Vec<Broker>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, category, personal_commission_pct, development_id, role_name \
             FROM broker ORDER BY name",
        )?;
        let raw: Vec<(String, String, String, Option<f64>, Option<String>, Option<String>)> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<rusqlite::Result<_>>()?;

        raw.into_iter().map(parse_broker).collect()
    }

    async fn insert_client(&self, client: &Client) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO client (id, full_name, tax_id) VALUES (?1, ?2, ?3)",
            params![client.id, client.full_name, client.tax_id],
        )?;
        Ok(())
    }

    async fn get_client(&self, id: &str) -> Result<Option<Client>, RepositoryError> {
        let conn = self.lock()?;
        let client = conn
            .query_row(
                "SELECT id, full_name, tax_id FROM client WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Client {
                        id: row.get(0)?,
                        full_name: row.get(1)?,
                        tax_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(client)
    }

    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, full_name, tax_id FROM client ORDER BY full_name")?;
        let clients = stmt
            .query_map([], |row| {
                Ok(Client {
                    id: row.get(0)?,
                    full_name: row.get(1)?,
                    tax_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(clients)
    }

    // ===== Sales =====

    async fn find_duplicate_candidates(
        &self,
        development_id: Option<&str>,
        client_id: Option<&str>,
        broker_id: &str,
        sale_date: NaiveDate,
    ) -> Result<Vec<Sale>, RepositoryError> {
        let conn = self.lock()?;
        // IS instead of = so NULL development/client compares equal.
        let sql = format!(
            "SELECT {} FROM sale \
             WHERE development_id IS ?1 AND client_id IS ?2 AND broker_id = ?3 AND sale_date = ?4",
            SALE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let raw: Vec<SaleRow> = stmt
            .query_map(
                params![development_id, client_id, broker_id, sale_date],
                read_sale_row,
            )?
            .collect::<rusqlite::Result<_>>()?;

        raw.into_iter().map(parse_sale).collect()
    }

    async fn create_sale_with_schedule(
        &self,
        sale: Sale,
        allocations: Vec<CommissionAllocation>,
        installments: Vec<PaymentInstallment>,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        insert_sale_row(&tx, &sale)?;
        insert_schedule_rows(&tx, &allocations, &installments)?;
        tx.commit()?;
        Ok(())
    }

    async fn update_sale_with_schedule(
        &self,
        sale: Sale,
        allocations: Vec<CommissionAllocation>,
        installments: Vec<PaymentInstallment>,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let affected = tx.execute("DELETE FROM sale WHERE id = ?1", params![sale.id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "sale",
                id: sale.id,
            });
        }
        // ON DELETE CASCADE already removed the old schedule rows.
        insert_sale_row(&tx, &sale)?;
        insert_schedule_rows(&tx, &allocations, &installments)?;
        tx.commit()?;
        Ok(())
    }

    async fn get_sale(&self, id: &str) -> Result<Option<Sale>, RepositoryError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM sale WHERE id = ?1", SALE_COLUMNS);
        let raw = conn
            .query_row(&sql, params![id], read_sale_row)
            .optional()?;
        raw.map(parse_sale).transpose()
    }

    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM sale ORDER BY sale_date, id", SALE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let raw: Vec<SaleRow> = stmt
            .query_map([], read_sale_row)?
            .collect::<rusqlite::Result<_>>()?;
        raw.into_iter().map(parse_sale).collect()
    }

    async fn delete_sale(&self, id: &str) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let affected = conn.execute("DELETE FROM sale WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "sale",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ===== Schedule and allocations =====

    async fn list_installments_by_sale(
        &self,
        sale_id: &str,
    ) -> Result<Vec<PaymentInstallment>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, sale_id, kind, installment_no, amount, expected_date, commission_amount, \
             status, paid_date, paid_commission_override \
             FROM payment_installment WHERE sale_id = ?1 \
             ORDER BY expected_date, installment_no",
        )?;
        let raw: Vec<InstallmentRow> = stmt
            .query_map(params![sale_id], |row| {
                Ok(InstallmentRow {
                    id: row.get(0)?,
                    sale_id: row.get(1)?,
                    kind: row.get(2)?,
                    installment_no: row.get(3)?,
                    amount: row.get(4)?,
                    expected_date: row.get(5)?,
                    commission_amount: row.get(6)?,
                    status: row.get(7)?,
                    paid_date: row.get(8)?,
                    paid_commission_override: row.get(9)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;

        raw.into_iter().map(parse_installment).collect()
    }

    async fn list_allocations_by_sale(
        &self,
        sale_id: &str,
    ) -> Result<Vec<CommissionAllocation>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, sale_id, role_name, percentage, amount \
             FROM commission_allocation WHERE sale_id = ?1 ORDER BY role_name",
        )?;
        let allocations = stmt
            .query_map(params![sale_id], |row| {
                Ok(CommissionAllocation {
                    id: row.get(0)?,
                    sale_id: row.get(1)?,
                    role_name: row.get(2)?,
                    percentage: row.get(3)?,
                    amount: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(allocations)
    }

    async fn mark_installment_paid(
        &self,
        installment_id: &str,
        paid_date: NaiveDate,
        commission_override: Option<f64>,
    ) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE payment_installment \
             SET status = 'paid', paid_date = ?2, paid_commission_override = ?3 \
             WHERE id = ?1",
            params![installment_id, paid_date, commission_override],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "payment_installment",
                id: installment_id.to_string(),
            });
        }
        Ok(())
    }

    // ===== Import batches =====

    async fn insert_import_batch(&self, record: &ImportBatchRecord) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO import_batch (batch_id, mode, dry_run, total_rows, processed_rows, \
             success_rows, error_rows, duplicate_rows, cancelled, started_at, finished_at, \
             report_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.batch_id,
                record.mode.to_string(),
                record.dry_run,
                record.total_rows,
                record.processed_rows,
                record.success_rows,
                record.error_rows,
                record.duplicate_rows,
                record.cancelled,
                record.started_at,
                record.finished_at,
                record.report_json,
            ],
        )?;
        Ok(())
    }

    async fn list_import_batches(&self) -> Result<Vec<ImportBatchRecord>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT batch_id, mode, dry_run, total_rows, processed_rows, success_rows, \
             error_rows, duplicate_rows, cancelled, started_at, finished_at, report_json \
             FROM import_batch ORDER BY started_at DESC",
        )?;
        let raw: Vec<(String, String, bool, i64, i64, i64, i64, i64, bool, DateTime<Utc>, DateTime<Utc>, String)> =
            stmt.query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                    row.get(9)?,
                    row.get(10)?,
                    row.get(11)?,
                ))
            })?
            .collect::<rusqlite::Result<_>>()?;

        raw.into_iter()
            .map(|r| {
                let mode = ImportMode::parse(&r.1).ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "import batch {}: unknown mode '{}'",
                        r.0, r.1
                    ))
                })?;
                Ok(ImportBatchRecord {
                    batch_id: r.0,
                    mode,
                    dry_run: r.2,
                    total_rows: r.3,
                    processed_rows: r.4,
                    success_rows: r.5,
                    error_rows: r.6,
                    duplicate_rows: r.7,
                    cancelled: r.8,
                    started_at: r.9,
                    finished_at: r.10,
                    report_json: r.11,
                })
            })
            .collect()
    }
}

fn parse_broker(
    raw: (String, String, String, Option<f64>, Option<String>, Option<String>),
) -> Result<Broker, RepositoryError> {
    let (id, name, category, personal_commission_pct, development_id, role_name) = raw;
    let category = BrokerCategory::parse(&category).ok_or_else(|| {
        RepositoryError::DataCorruption(format!("broker {}: unknown category '{}'", id, category))
    })?;
    Ok(Broker {
        id,
        name,
        category,
        personal_commission_pct,
        development_id,
        role_name,
    })
}
