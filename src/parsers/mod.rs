// ==========================================
// Realty Ledger - Parsers
// ==========================================
// Locale-tolerant field parsing for the commission import schema:
// dates (Brazilian, US-short and spreadsheet serials), currency
// values, column-header matching and raw file parsing.
// ==========================================

pub mod column;
pub mod currency;
pub mod date;
pub mod file;

pub use column::{commission_import_schema, resolve_columns, ColumnMap, ColumnSpec, ImportField};
pub use currency::parse_currency;
pub use date::parse_sale_date;
pub use file::{CsvParser, ExcelParser, RawSheet, UniversalFileParser};

use serde::{Deserialize, Serialize};

// ==========================================
// CellValue - raw spreadsheet cell
// ==========================================
// XLSX cells keep their native type so numeric serial dates are
// not lost to stringification; CSV cells arrive as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Textual form of the cell, trimmed; None when blank.
    /// Integral numbers render without a fractional part so unit
    /// numbers read back as "1203", not "1203.0".
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}

/// Parse a cell as a non-negative integer count (installment or
/// balloon count columns). Blank cells count as zero upstream.
pub fn parse_count(value: &CellValue) -> Option<u32> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => {
            if *n >= 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX) {
                Some(*n as u32)
            } else {
                None
            }
        }
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            let parsed: f64 = trimmed.parse().ok()?;
            if parsed >= 0.0 && parsed.fract() == 0.0 && parsed <= f64::from(u32::MAX) {
                Some(parsed as u32)
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_text_formats_integral_numbers() {
        assert_eq!(
            CellValue::Number(1203.0).as_text(),
            Some("1203".to_string())
        );
        assert_eq!(CellValue::Text("  A  ".to_string()).as_text(), Some("A".to_string()));
        assert_eq!(CellValue::Text("   ".to_string()).as_text(), None);
        assert_eq!(CellValue::Empty.as_text(), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(&CellValue::Number(3.0)), Some(3));
        assert_eq!(parse_count(&CellValue::Text("12".to_string())), Some(12));
        assert_eq!(parse_count(&CellValue::Number(3.5)), None);
        assert_eq!(parse_count(&CellValue::Number(-1.0)), None);
        assert_eq!(parse_count(&CellValue::Empty), None);
    }
}
