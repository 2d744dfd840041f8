// Small dev utility: run a commission spreadsheet through the
// import pipeline and print the batch report as JSON.
//
// Usage:
//   cargo run --bin import_sales -- <db_path> <file.csv|file.xlsx> [--test] [--dry-run]
//
// --test     process only the first rows (test-mode limit)
// --dry-run  validate and report without persisting anything

use realty_ledger::domain::ImportMode;
use realty_ledger::importer::{BatchImporter, CancelToken, ImportOptions};
use realty_ledger::repository::SqliteLedgerStore;
use realty_ledger::{logging, ImportConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let (db_path, file_path) = match positional.as_slice() {
        [db, file] => (db.as_str(), file.as_str()),
        _ => {
            eprintln!("usage: import_sales <db_path> <file.csv|file.xlsx> [--test] [--dry-run]");
            std::process::exit(2);
        }
    };

    let options = ImportOptions {
        mode: if args.iter().any(|a| a == "--test") {
            ImportMode::Test
        } else {
            ImportMode::Full
        },
        dry_run: args.iter().any(|a| a == "--dry-run"),
    };

    let store = Arc::new(SqliteLedgerStore::open(db_path)?);
    let importer = BatchImporter::new(store, ImportConfig::default());

    let report = importer
        .import_from_file(file_path, options, &CancelToken::new())
        .await?;

    println!("{}", report.to_json()?);
    Ok(())
}
