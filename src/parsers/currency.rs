// ==========================================
// Realty Ledger - Currency Parser
// ==========================================
// Tolerates Brazilian formatting ("1.234,56"), plain decimals and
// numeric cells. Output is a non-negative amount or None.
// ==========================================

use crate::parsers::CellValue;

/// Parse a currency cell into a non-negative amount.
///
/// String handling: everything except digits, `.`, `,` and `-` is
/// stripped (currency symbols, spaces). When both separators are
/// present, whichever appears last is the decimal separator and the
/// other is removed as a thousands separator. A lone `,` is always
/// decimal. A lone `.` is a thousands separator only when more than
/// three digits follow it.
pub fn parse_currency(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => {
            if *n >= 0.0 {
                Some(*n)
            } else {
                None
            }
        }
        CellValue::Text(s) => parse_text(s),
    }
}

fn parse_text(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if comma > dot {
                // "1.234,56" → comma is decimal
                cleaned.replace('.', "").replace(',', ".")
            } else {
                // "1,234.56" → dot is decimal
                cleaned.replace(',', "")
            }
        }
        (None, Some(_)) => cleaned.replace(',', "."),
        (Some(dot), None) => {
            let fraction_digits = cleaned.len() - dot - 1;
            if fraction_digits > 3 {
                // "230.1125" → grouping, not decimals
                cleaned.replace('.', "")
            } else {
                cleaned
            }
        }
        (None, None) => cleaned,
    };

    let amount: f64 = normalized.parse().ok()?;
    if amount >= 0.0 {
        Some(amount)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_brazilian_thousands_and_decimal() {
        assert_eq!(parse_currency(&text("230.112,00")), Some(230_112.00));
        assert_eq!(parse_currency(&text("R$ 1.234,56")), Some(1_234.56));
    }

    #[test]
    fn test_comma_only_is_decimal() {
        assert_eq!(parse_currency(&text("230,00")), Some(230.00));
    }

    #[test]
    fn test_dot_only() {
        // Short fraction group: decimal.
        assert_eq!(parse_currency(&text("230112.00")), Some(230_112.00));
        // Long fraction group: grouping.
        assert_eq!(parse_currency(&text("230.1125")), Some(2_301_125.0));
    }

    #[test]
    fn test_us_style_both_separators() {
        assert_eq!(parse_currency(&text("1,234.56")), Some(1_234.56));
    }

    #[test]
    fn test_numeric_cell_passthrough() {
        assert_eq!(parse_currency(&CellValue::Number(500_000.0)), Some(500_000.0));
        assert_eq!(parse_currency(&CellValue::Number(0.0)), Some(0.0));
    }

    #[test]
    fn test_negative_is_invalid() {
        assert_eq!(parse_currency(&CellValue::Number(-5.0)), None);
        assert_eq!(parse_currency(&text("-5,00")), None);
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(parse_currency(&text("n/a")), None);
        assert_eq!(parse_currency(&text("")), None);
        assert_eq!(parse_currency(&CellValue::Empty), None);
    }
}
