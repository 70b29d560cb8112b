//! Amount parsing for spreadsheet cells and OCR text.
//!
//! Amounts arrive as native numbers, as French-formatted text
//! (`1 234 567,89`), as English-formatted text (`1,234,567.89`), with currency
//! markers, or as garbage. Every input maps to exactly one value; anything
//! unparseable becomes zero.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::workbook::CellValue;
use crate::types::Money;

/// Currency markers removed before separator analysis. Longest first so
/// `FCFA` is not left as `F` after removing `CFA`.
const CURRENCY_MARKERS: [&str; 9] = ["FCFA", "XOF", "XAF", "CFA", "EUR", "€", "$", "£", "¥"];

/// Parse a cell. Empty cells and blank text are zero.
pub fn parse_cell(cell: &CellValue) -> Money {
    match cell {
        CellValue::Empty | CellValue::Bool(_) => Decimal::ZERO,
        CellValue::Int(i) => Decimal::from(*i),
        CellValue::Float(f) => parse_float(*f),
        CellValue::Text(s) => parse_text(s),
    }
}

/// Parse a cell, treating empty cells and blank text as absent.
pub fn parse_optional_cell(cell: &CellValue) -> Option<Money> {
    match cell {
        CellValue::Empty => None,
        CellValue::Text(s) if s.trim().is_empty() => None,
        other => Some(parse_cell(other)),
    }
}

/// Native spreadsheet number. Non-finite values are zero.
pub fn parse_float(value: f64) -> Money {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Parse a formatted amount.
pub fn parse_text(raw: &str) -> Money {
    let mut text: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if text.is_empty() {
        return Decimal::ZERO;
    }
    for marker in CURRENCY_MARKERS {
        text = text.replace(marker, "");
    }
    // "F CFA" leaves a lone F once spaces and CFA are gone.
    let text = text.trim_end_matches(['F', 'f']);

    let (negative, body) = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, text),
    };

    let normalized = normalize_separators(body);
    let cleaned: String = normalized
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let value = Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO);
    if negative {
        -value.abs()
    } else {
        value
    }
}

/// Rewrite `,`/`.` so that at most one `.` remains, as the decimal point.
fn normalize_separators(text: &str) -> String {
    let last_comma = text.rfind(',');
    let last_dot = text.rfind('.');

    match (last_comma, last_dot) {
        // Both present: the rightmost one is the decimal separator.
        (Some(c), Some(d)) if c > d => text.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => text.replace(',', ""),
        (Some(c), None) => {
            let commas = text.matches(',').count();
            let digits_after = text[c + 1..].chars().filter(|ch| ch.is_ascii_digit()).count();
            if commas == 1 && digits_after <= 3 {
                text.replace(',', ".")
            } else {
                text.replace(',', "")
            }
        }
        (None, Some(_)) if text.matches('.').count() > 1 => text.replace('.', ""),
        _ => text.to_string(),
    }
}
