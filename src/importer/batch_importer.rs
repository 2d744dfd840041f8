// ==========================================
// Realty Ledger - Batch Import Orchestrator
// ==========================================
// Drives a spreadsheet through the full pipeline: file parse,
// column resolution, row mapping, per-row validation and entity
// resolution, then sale creation through the engine. Rows are
// strictly sequential so a sale created for row N is visible to
// the duplicate check of row N+1.
//
// Row failures never abort the batch; they land on the row report
// and the run continues. Only file-level problems (unreadable
// file, missing required columns) fail the whole run.
// ==========================================

use crate::config::ImportConfig;
use crate::domain::{
    BalloonTerms, BatchReport, BatchState, BatchStats, DealTerms, DownPayment, ImportBatchRecord,
    ImportMode, InstallmentGroup, RowReport, RowStatus, Sale, SaleStatus,
};
use crate::engine::{duplicate, SaleCreation, SaleDraft, SaleEngine};
use crate::importer::error::ImportError;
use crate::importer::row_mapper::{map_rows, RawSaleRow};
use crate::parsers::{
    commission_import_schema, parse_count, parse_currency, parse_sale_date, resolve_columns,
    CellValue, UniversalFileParser,
};
use crate::repository::LedgerStore;
use crate::resolver::EntityResolver;
use chrono::{Local, Utc};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// CancelToken
// ==========================================
// Shared flag polled at row boundaries; the row in flight always
// completes before the batch stops.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ==========================================
// ImportOptions
// ==========================================
// Test mode and dry run are orthogonal: test mode limits how many
// rows run, dry run decides whether anything persists.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub mode: ImportMode,
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            mode: ImportMode::Full,
            dry_run: false,
        }
    }
}

enum RowOutcome {
    Created { sale_id: Option<String> },
    Duplicate,
}

// ==========================================
// BatchImporter
// ==========================================
pub struct BatchImporter {
    store: Arc<dyn LedgerStore>,
    config: ImportConfig,
}

impl BatchImporter {
    pub fn new(store: Arc<dyn LedgerStore>, config: ImportConfig) -> Self {
        Self { store, config }
    }

    /// Parse the file, resolve its columns against the commission
    /// schema and run the batch.
    pub async fn import_from_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        options: ImportOptions,
        cancel: &CancelToken,
    ) -> Result<BatchReport, ImportError> {
        let sheet = UniversalFileParser.parse(file_path)?;
        let columns = resolve_columns(&sheet.headers, &commission_import_schema())
            .map_err(ImportError::MissingColumns)?;
        let rows = map_rows(&sheet, &columns);
        self.run(rows, options, cancel).await
    }

    #[instrument(skip_all, fields(total_rows = rows.len(), dry_run = options.dry_run))]
    pub async fn run(
        &self,
        rows: Vec<RawSaleRow>,
        options: ImportOptions,
        cancel: &CancelToken,
    ) -> Result<BatchReport, ImportError> {
        let batch_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();

        info!(batch_id = %batch_id, mode = %options.mode, "import batch started");

        // Step 1: load the registries once for the whole batch.
        let resolver = EntityResolver::new(
            self.store.list_developments().await?,
            self.store.list_brokers().await?,
            self.store.list_clients().await?,
        );
        let engine = SaleEngine::new(self.store.clone(), self.config.clone());

        // Step 2: apply the test-mode row limit.
        let limit = match options.mode {
            ImportMode::Test => self.config.test_mode_row_limit.min(rows.len()),
            ImportMode::Full => rows.len(),
        };

        // Sales assembled during a dry run, so intra-batch
        // duplicates are still caught without persisting anything.
        let mut dry_run_sales: Vec<Sale> = Vec::new();

        let mut stats = BatchStats::default();
        let mut row_reports = Vec::with_capacity(limit);
        let mut processed = 0usize;
        let mut cancelled = false;

        // Step 3: strictly sequential row loop.
        for row in rows.iter().take(limit) {
            if cancel.is_cancelled() {
                cancelled = true;
                warn!(batch_id = %batch_id, row = row.row_number, "batch cancelled");
                break;
            }
            processed += 1;

            let mut warnings = Vec::new();
            match self
                .process_row(row, &resolver, &engine, options.dry_run, &mut dry_run_sales, &mut warnings)
                .await
            {
                Ok(RowOutcome::Created { sale_id }) => {
                    stats.success += 1;
                    if sale_id.is_some() {
                        stats.created += 1;
                    }
                    row_reports.push(RowReport {
                        row_number: row.row_number,
                        status: RowStatus::Success,
                        error: None,
                        warnings,
                        sale_id,
                    });
                }
                Ok(RowOutcome::Duplicate) => {
                    stats.duplicate += 1;
                    row_reports.push(RowReport {
                        row_number: row.row_number,
                        status: RowStatus::Duplicate,
                        error: None,
                        warnings,
                        sale_id: None,
                    });
                }
                Err(err) => {
                    stats.error += 1;
                    warn!(batch_id = %batch_id, row = row.row_number, error = %err, "row failed");
                    row_reports.push(RowReport {
                        row_number: row.row_number,
                        status: RowStatus::Error,
                        error: Some(err.to_string()),
                        warnings,
                        sale_id: None,
                    });
                }
            }
        }

        let report = BatchReport {
            batch_id: batch_id.clone(),
            mode: options.mode,
            dry_run: options.dry_run,
            state: if cancelled {
                BatchState::Cancelled
            } else {
                BatchState::Completed
            },
            total_rows: rows.len(),
            processed_rows: processed,
            stats,
            rows: row_reports,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        };

        // Step 4: persist the run summary (dry runs leave no trace).
        if !options.dry_run {
            let record = ImportBatchRecord::from_report(&report)?;
            self.store.insert_import_batch(&record).await?;
        }

        info!(
            batch_id = %batch_id,
            success = stats.success,
            error = stats.error,
            duplicate = stats.duplicate,
            created = stats.created,
            cancelled,
            "import batch finished"
        );
        Ok(report)
    }

    async fn process_row(
        &self,
        row: &RawSaleRow,
        resolver: &EntityResolver,
        engine: &SaleEngine,
        dry_run: bool,
        dry_run_sales: &mut Vec<Sale>,
        warnings: &mut Vec<String>,
    ) -> Result<RowOutcome, ImportError> {
        let n = row.row_number;

        // ===== References =====
        let development_name = row
            .development_name
            .as_deref()
            .ok_or_else(|| missing(n, "development name"))?;
        let development = resolver.resolve_development(development_name);
        if development.ambiguous {
            warnings.push(format!("ambiguous development name: {}", development_name));
        }
        let development = development
            .entity
            .ok_or_else(|| ImportError::UnknownDevelopment {
                row: n,
                name: development_name.to_string(),
            })?;

        let broker_name = row
            .broker_name
            .as_deref()
            .ok_or_else(|| missing(n, "broker name"))?;
        let broker = resolver.resolve_broker(broker_name);
        if broker.ambiguous {
            warnings.push(format!("ambiguous broker name: {}", broker_name));
        }
        let broker = broker.entity.ok_or_else(|| ImportError::UnknownBroker {
            row: n,
            name: broker_name.to_string(),
        })?;

        // Client is best-effort: a miss is a warning, never an error.
        let client_id = match row.client_name.as_deref() {
            Some(name) => {
                let client = resolver.resolve_client(name);
                if client.ambiguous {
                    warnings.push(format!("ambiguous client name: {}", name));
                }
                match client.entity {
                    Some(c) => Some(c.id),
                    None => {
                        warnings.push(format!("client not found: {}", name));
                        None
                    }
                }
            }
            None => None,
        };

        // ===== Deal values =====
        let date_cell = row.sale_date.as_ref().ok_or_else(|| missing(n, "sale date"))?;
        let sale_date = parse_sale_date(date_cell).ok_or_else(|| ImportError::InvalidDate {
            row: n,
            value: cell_text(date_cell),
        })?;
        if sale_date > Local::now().date_naive() {
            warnings.push(format!("sale date {} is in the future", sale_date));
        }

        let price_cell = row.total_price.as_ref().ok_or_else(|| missing(n, "total price"))?;
        let sale_price = parse_currency(price_cell)
            .filter(|p| *p > 0.0)
            .ok_or_else(|| ImportError::InvalidPrice {
                row: n,
                value: cell_text(price_cell),
            })?;

        let signal = optional_amount(n, "signal amount", row.signal_amount.as_ref())?;
        let terms = self.build_terms(n, row, signal)?;

        if terms.pro_soluto_total() > sale_price {
            warnings.push(format!(
                "pro-soluto total {:.2} exceeds sale price {:.2}",
                terms.pro_soluto_total(),
                sale_price
            ));
        }

        let draft = SaleDraft {
            development_id: Some(development.id),
            broker_id: broker.id,
            client_id,
            unit_number: row.unit_number.clone(),
            block: row.block.clone(),
            floor: row.floor.clone(),
            sale_date,
            sale_price,
            status: SaleStatus::Pending,
            terms,
        };

        // ===== Create (or dry-run assemble) =====
        if dry_run {
            let stored = self
                .store
                .find_duplicate_candidates(
                    draft.development_id.as_deref(),
                    draft.client_id.as_deref(),
                    &draft.broker_id,
                    draft.sale_date,
                )
                .await?;
            if duplicate::find_duplicate(&draft, &stored).is_some()
                || duplicate::find_duplicate(&draft, dry_run_sales).is_some()
            {
                return Ok(RowOutcome::Duplicate);
            }
            let assembled = engine.assemble(&draft).await?;
            dry_run_sales.push(assembled.sale);
            return Ok(RowOutcome::Created { sale_id: None });
        }

        match engine.create_sale(draft).await? {
            SaleCreation::Created { sale_id } => Ok(RowOutcome::Created {
                sale_id: Some(sale_id),
            }),
            SaleCreation::Duplicate { .. } => Ok(RowOutcome::Duplicate),
        }
    }

    /// Assemble the pro-soluto terms from the raw count/value
    /// columns, applying the consistency checks.
    fn build_terms(
        &self,
        n: usize,
        row: &RawSaleRow,
        signal: Option<f64>,
    ) -> Result<DealTerms, ImportError> {
        let installment_count = optional_count(n, "installment count", row.installment_count.as_ref())?;
        let installment_value = optional_amount(n, "installment value", row.installment_value.as_ref())?;
        let balloon_count = optional_count(n, "balloon count", row.balloon_count.as_ref())?;
        let balloon_value = optional_amount(n, "balloon value", row.balloon_value.as_ref())?;

        let down_payment = match (installment_count.unwrap_or(0), installment_value) {
            (0, None) => DownPayment::None,
            // A value with no count reads as a lump down payment;
            // the column mix-up heuristic applies here too.
            (0, Some(value)) if value > 0.0 => {
                if value < self.config.min_installment_value {
                    return Err(ImportError::SuspiciousInstallmentValue {
                        row: n,
                        value,
                        min: self.config.min_installment_value,
                    });
                }
                DownPayment::Lump { amount: value }
            }
            (0, Some(_)) => DownPayment::None,
            (count, Some(value)) if value > 0.0 => {
                if value < self.config.min_installment_value {
                    return Err(ImportError::SuspiciousInstallmentValue {
                        row: n,
                        value,
                        min: self.config.min_installment_value,
                    });
                }
                DownPayment::Installments {
                    groups: vec![InstallmentGroup {
                        count,
                        amount: value,
                    }],
                }
            }
            (count, _) => {
                return Err(ImportError::InconsistentInstallments {
                    row: n,
                    message: format!("{} installments with no per-installment value", count),
                })
            }
        };

        let balloon = match (balloon_count.unwrap_or(0), balloon_value) {
            (0, None) => BalloonTerms::None,
            // A balloon value with no count reads as one balloon.
            (0, Some(value)) if value > 0.0 => confirmed_balloon(n, 1, value, &self.config)?,
            (0, Some(_)) => BalloonTerms::None,
            (count, Some(value)) if value > 0.0 => confirmed_balloon(n, count, value, &self.config)?,
            (count, _) => {
                return Err(ImportError::InconsistentInstallments {
                    row: n,
                    message: format!("{} balloons with no per-balloon value", count),
                })
            }
        };

        Ok(DealTerms {
            signal: signal.filter(|s| *s > 0.0),
            down_payment,
            balloon,
        })
    }
}

fn confirmed_balloon(
    n: usize,
    count: u32,
    value: f64,
    config: &ImportConfig,
) -> Result<BalloonTerms, ImportError> {
    if value < config.min_installment_value {
        return Err(ImportError::SuspiciousInstallmentValue {
            row: n,
            value,
            min: config.min_installment_value,
        });
    }
    Ok(BalloonTerms::Confirmed {
        groups: vec![InstallmentGroup {
            count,
            amount: value,
        }],
    })
}

fn missing(row: usize, field: &str) -> ImportError {
    ImportError::MissingField {
        row,
        field: field.to_string(),
    }
}

fn cell_text(cell: &CellValue) -> String {
    cell.as_text().unwrap_or_default()
}

fn optional_amount(
    row: usize,
    field: &str,
    cell: Option<&CellValue>,
) -> Result<Option<f64>, ImportError> {
    match cell {
        None => Ok(None),
        Some(c) => parse_currency(c)
            .map(Some)
            .ok_or_else(|| ImportError::InvalidAmount {
                row,
                field: field.to_string(),
                value: cell_text(c),
            }),
    }
}

fn optional_count(
    row: usize,
    field: &str,
    cell: Option<&CellValue>,
) -> Result<Option<u32>, ImportError> {
    match cell {
        None => Ok(None),
        Some(c) => parse_count(c)
            .map(Some)
            .ok_or_else(|| ImportError::InvalidAmount {
                row,
                field: field.to_string(),
                value: cell_text(c),
            }),
    }
}
