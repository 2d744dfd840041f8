// ==========================================
// Realty Ledger - Raw Row Mapper
// ==========================================
// Projects each sheet row through the resolved column map into a
// named raw-field struct. No parsing or validation here; cells
// stay as typed raw values for the orchestrator to interpret.
// ==========================================

use crate::parsers::{CellValue, ColumnMap, ImportField, RawSheet};

// ==========================================
// RawSaleRow - one sheet row, named fields
// ==========================================
#[derive(Debug, Clone)]
pub struct RawSaleRow {
    pub row_number: usize,

    // ===== Name fields (resolved downstream) =====
    pub development_name: Option<String>,
    pub block: Option<String>,
    pub unit_number: Option<String>,
    pub floor: Option<String>,
    pub client_name: Option<String>,
    pub broker_name: Option<String>,

    // ===== Value fields (kept raw for locale parsing) =====
    pub sale_date: Option<CellValue>,
    pub total_price: Option<CellValue>,
    pub signal_amount: Option<CellValue>,
    pub installment_count: Option<CellValue>,
    pub installment_value: Option<CellValue>,
    pub balloon_count: Option<CellValue>,
    pub balloon_value: Option<CellValue>,
}

pub fn map_rows(sheet: &RawSheet, columns: &ColumnMap) -> Vec<RawSaleRow> {
    sheet
        .rows
        .iter()
        .map(|(row_number, cells)| RawSaleRow {
            row_number: *row_number,
            development_name: text_at(cells, columns, ImportField::DevelopmentName),
            block: text_at(cells, columns, ImportField::Block),
            unit_number: text_at(cells, columns, ImportField::UnitNumber),
            floor: text_at(cells, columns, ImportField::Floor),
            client_name: text_at(cells, columns, ImportField::ClientName),
            broker_name: text_at(cells, columns, ImportField::BrokerName),
            sale_date: cell_at(cells, columns, ImportField::SaleDate),
            total_price: cell_at(cells, columns, ImportField::TotalPrice),
            signal_amount: cell_at(cells, columns, ImportField::SignalAmount),
            installment_count: cell_at(cells, columns, ImportField::InstallmentCount),
            installment_value: cell_at(cells, columns, ImportField::InstallmentValue),
            balloon_count: cell_at(cells, columns, ImportField::BalloonCount),
            balloon_value: cell_at(cells, columns, ImportField::BalloonValue),
        })
        .collect()
}

fn cell_at(cells: &[CellValue], columns: &ColumnMap, field: ImportField) -> Option<CellValue> {
    let idx = *columns.get(&field)?;
    match cells.get(idx) {
        Some(cell) if !cell.is_empty() => Some(cell.clone()),
        _ => None,
    }
}

fn text_at(cells: &[CellValue], columns: &ColumnMap, field: ImportField) -> Option<String> {
    cell_at(cells, columns, field)?.as_text()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{commission_import_schema, resolve_columns};

    #[test]
    fn test_map_rows_projects_named_fields() {
        let headers: Vec<String> = ["EMPREENDIMENTO", "DATA", "VALOR TOTAL", "CORRETOR", "CLIENTE"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let columns = resolve_columns(&headers, &commission_import_schema()).unwrap();

        let sheet = RawSheet {
            headers,
            rows: vec![(
                1,
                vec![
                    CellValue::Text("Ocean View".to_string()),
                    CellValue::Text("15/03/2024".to_string()),
                    CellValue::Number(500_000.0),
                    CellValue::Text("Jane Doe".to_string()),
                    CellValue::Empty,
                ],
            )],
        };

        let rows = map_rows(&sheet, &columns);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].development_name.as_deref(), Some("Ocean View"));
        assert_eq!(rows[0].client_name, None);
        assert_eq!(rows[0].total_price, Some(CellValue::Number(500_000.0)));
        // Column absent from the sheet entirely.
        assert_eq!(rows[0].balloon_count, None);
    }
}
