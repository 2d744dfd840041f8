// ==========================================
// Realty Ledger - Sale Date Parser
// ==========================================
// Upstream exports mix ISO timestamps, Brazilian DD/MM/YYYY,
// a month-first M/D/YY short form (one legacy platform export)
// and raw spreadsheet serial numbers. Resolution order below is
// fixed; first match wins.
// ==========================================

use crate::parsers::CellValue;
use chrono::{Datelike, Duration, NaiveDate};

/// Smallest serial accepted as a date (≈ 2000-01-01). Plain small
/// integers (unit counts, prices) must never be read as dates.
const SERIAL_MIN: f64 = 36_526.0;
/// Largest serial accepted as a date (≈ 2099).
const SERIAL_MAX: f64 = 73_000.0;

/// Parse a sale date cell.
///
/// Resolution order (first match wins):
/// 1. ISO `YYYY-MM-DD...` → date portion
/// 2. `DD/MM/YYYY` (day-first, 4-digit year 1900-2100)
/// 3. `M/D/YY` (month-first, 2-digit year + 2000)
/// 4. Integer spreadsheet serial in [36526, 73000], 1900 epoch
///
/// Returns None when no rule matches; the caller must fail the row.
pub fn parse_sale_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => parse_serial(*n),
        CellValue::Text(s) => parse_text(s.trim()),
    }
}

fn parse_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }

    if let Some(date) = parse_iso_prefix(s) {
        return Some(date);
    }

    if let Some(date) = parse_day_first(s) {
        return Some(date);
    }

    if let Some(date) = parse_month_first_short(s) {
        return Some(date);
    }

    // A numeric string exported from a spreadsheet cell.
    if let Ok(n) = s.parse::<f64>() {
        return parse_serial(n);
    }

    None
}

/// Rule 1: already ISO (`YYYY-MM-DD`, possibly with a time suffix).
/// The same year window as the other rules applies.
fn parse_iso_prefix(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() < 10 {
        return None;
    }
    let shape_ok = bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5].is_ascii_digit()
        && bytes[6].is_ascii_digit()
        && bytes[7] == b'-'
        && bytes[8].is_ascii_digit()
        && bytes[9].is_ascii_digit();
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d")
        .ok()
        .filter(|d| (1900..=2100).contains(&d.year()))
}

/// Rule 2: `DD/MM/YYYY` with a 4-digit year.
fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 || parts[2].len() != 4 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year: i32 = parts[2].trim().parse().ok()?;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) || !(1900..=2100).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Rule 3: `M/D/YY` — month-first with a 2-digit year. This is the
/// reverse field order of rule 2; one upstream platform exports
/// this way and always with a 2-digit year, which is how the two
/// forms are told apart.
fn parse_month_first_short(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 || parts[2].is_empty() || parts[2].len() > 2 {
        return None;
    }
    let month: u32 = parts[0].trim().parse().ok()?;
    let day: u32 = parts[1].trim().parse().ok()?;
    let short_year: i32 = parts[2].trim().parse().ok()?;
    let year = 2000 + short_year;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) || !(2000..=2099).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Rule 4: spreadsheet serial, 1900 epoch. Excel serial 60 is the
/// phantom 1900-02-29, so everything in our accepted range sits two
/// days past a naive 1900-01-01 offset; anchoring at 1899-12-30
/// applies that correction.
fn parse_serial(n: f64) -> Option<NaiveDate> {
    if n.fract() != 0.0 || !(SERIAL_MIN..=SERIAL_MAX).contains(&n) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch + Duration::days(n as i64);
    if (2000..=2100).contains(&date.year()) {
        Some(date)
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

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_first_brazilian() {
        assert_eq!(parse_sale_date(&text("15/03/2024")), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_sale_date(&text("01/12/1999")), Some(ymd(1999, 12, 1)));
    }

    #[test]
    fn test_iso_with_time_suffix() {
        assert_eq!(
            parse_sale_date(&text("2024-03-15 00:00:00")),
            Some(ymd(2024, 3, 15))
        );
        assert_eq!(parse_sale_date(&text("2024-03-15")), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_month_first_two_digit_year() {
        // Month-first: 9/5/25 is September 5th, not May 9th.
        assert_eq!(parse_sale_date(&text("9/5/25")), Some(ymd(2025, 9, 5)));
        assert_eq!(parse_sale_date(&text("12/31/25")), Some(ymd(2025, 12, 31)));
    }

    #[test]
    fn test_spreadsheet_serial() {
        let parsed = parse_sale_date(&CellValue::Number(45_000.0)).unwrap();
        assert_eq!(parsed.year(), 2023);
        // Serial range lower bound is 2000-01-01.
        assert_eq!(
            parse_sale_date(&CellValue::Number(36_526.0)),
            Some(ymd(2000, 1, 1))
        );
    }

    #[test]
    fn test_small_integer_is_not_a_date() {
        assert_eq!(parse_sale_date(&CellValue::Number(5.0)), None);
        assert_eq!(parse_sale_date(&text("5")), None);
    }

    #[test]
    fn test_serial_in_text_cell() {
        // CSV exports stringify serials.
        assert!(parse_sale_date(&text("45000")).is_some());
    }

    #[test]
    fn test_invalid_calendar_day_rejected() {
        assert_eq!(parse_sale_date(&text("31/02/2024")), None);
        assert_eq!(parse_sale_date(&text("32/01/2024")), None);
        assert_eq!(parse_sale_date(&text("15/13/2024")), None);
    }

    #[test]
    fn test_year_outside_window_rejected() {
        assert_eq!(parse_sale_date(&text("15/03/1899")), None);
        assert_eq!(parse_sale_date(&text("15/03/2101")), None);
        // The ISO rule honors the same window.
        assert_eq!(parse_sale_date(&text("1850-03-15")), None);
        assert_eq!(parse_sale_date(&text("2101-01-01 00:00:00")), None);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(parse_sale_date(&text("not a date")), None);
        assert_eq!(parse_sale_date(&CellValue::Empty), None);
        assert_eq!(parse_sale_date(&text("")), None);
    }
}
