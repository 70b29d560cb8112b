use log::{debug, info, warn};
use std::collections::BTreeSet;

use super::cell_map::{layout, CellMapping};
use super::parser::parse_optional_cell;
use super::workbook::{Sheet, Workbook};
use super::{finalize, ExtractionOptions, ExtractionOutput};
use crate::statements::{MultiyearData, YearKey};

/// Read the template sheets of `workbook` into a multi-year record.
///
/// Missing sheets are reported as warnings and skipped; a workbook with
/// nothing extractable yields empty data plus an explanatory warning, never
/// an error.
pub fn extract_statements(workbook: &Workbook, options: &ExtractionOptions) -> ExtractionOutput {
    let mut data = MultiyearData::new();
    let mut warnings = Vec::new();
    let mut reported_sheets = BTreeSet::new();

    for statement in layout() {
        let sheet = match workbook.sheet(statement.sheet) {
            Some(sheet) if !sheet.is_empty() => sheet,
            found => {
                if reported_sheets.insert(statement.sheet) {
                    warnings.push(sheet_warning(workbook, statement.sheet, found.is_some()));
                }
                continue;
            }
        };

        let extracted = statement
            .rows
            .iter()
            .map(|mapping| read_mapping(sheet, mapping, options, &mut data, &mut warnings))
            .sum::<usize>();
        debug!(
            "{:?}: {} value(s) read from sheet \"{}\"",
            statement.statement, extracted, statement.sheet
        );
    }

    let output = finalize(data, warnings);
    info!(
        "workbook extraction: {} field(s) over {} year(s), {} warning(s)",
        output.data.field_count(),
        output.data.len(),
        output.warnings.len()
    );
    output
}

/// Warning for a template sheet that is absent or holds no cell. Missing
/// sheets list the sheets the workbook does have.
fn sheet_warning(workbook: &Workbook, name: &str, present: bool) -> String {
    if present {
        warn!("sheet \"{name}\" is empty");
        return format!("Feuille \"{name}\" vide dans le classeur");
    }
    warn!("sheet \"{name}\" not found in workbook");
    let available: Vec<&str> = workbook.sheet_names().collect();
    if available.is_empty() {
        format!("Feuille \"{name}\" non trouvée dans le classeur")
    } else {
        format!(
            "Feuille \"{name}\" non trouvée dans le classeur (feuilles disponibles : {})",
            available.join(", ")
        )
    }
}

/// Read the current and prior cells of one template line. Returns the number
/// of values stored.
fn read_mapping(
    sheet: &Sheet,
    mapping: &CellMapping,
    options: &ExtractionOptions,
    data: &mut MultiyearData,
    warnings: &mut Vec<String>,
) -> usize {
    let mut stored = 0;
    for (key, address) in [
        (YearKey::CURRENT, mapping.current),
        (YearKey::PRIOR, mapping.prior),
    ] {
        let year = key.year_for(options.reference_year);
        if !options.accepts(year) {
            continue;
        }
        let Some(value) = parse_optional_cell(sheet.get(address)) else {
            continue;
        };
        match data.entry(key, options.reference_year) {
            Ok(record) => {
                record.data.set(mapping.field, value);
                stored += 1;
            }
            Err(e) => warnings.push(format!("{} ({}): {e}", mapping.field, address)),
        }
    }
    stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statements::FieldKey;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn filled_workbook() -> Workbook {
        Workbook::new()
            .with_cell("Bilan", "E35", "10700000")
            .and_then(|w| w.with_cell("Bilan", "F35", "9 800 000"))
            .and_then(|w| w.with_cell("Bilan", "I15", "6000000"))
            .and_then(|w| w.with_cell("CR", "E12", 8_000_000.0))
            .and_then(|w| w.with_cell("CR", "E46", "1 000 000"))
            .and_then(|w| w.with_cell("TFT", "E11", "1 250 000"))
            .unwrap()
    }

    #[test]
    fn test_current_and_prior_columns() {
        let out = extract_statements(&filled_workbook(), &ExtractionOptions::for_year(2024));
        let n = out.data.get(YearKey::CURRENT).unwrap();
        let n1 = out.data.get(YearKey::PRIOR).unwrap();
        assert_eq!(n.year, 2024);
        assert_eq!(n1.year, 2023);
        assert_eq!(n.data.get(FieldKey::TotalActif), Some(dec!(10700000)));
        assert_eq!(n1.data.get(FieldKey::TotalActif), Some(dec!(9800000)));
        assert_eq!(n.data.get(FieldKey::FluxOperationnels), Some(dec!(1250000)));
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    }

    #[test]
    fn test_empty_cells_are_absent_not_zero() {
        let out = extract_statements(&filled_workbook(), &ExtractionOptions::for_year(2024));
        let n = out.data.get(YearKey::CURRENT).unwrap();
        assert!(!n.data.contains(FieldKey::Clients));
        assert_eq!(n.data.len(), 5);
    }

    #[test]
    fn test_year_range_filter() {
        let options = ExtractionOptions::for_year(2024).with_year_range(2024, 2030);
        let out = extract_statements(&filled_workbook(), &options);
        assert!(out.data.get(YearKey::PRIOR).is_none());
        assert!(out.data.get(YearKey::CURRENT).is_some());
    }

    #[test]
    fn test_missing_sheet_warned_once() {
        let workbook = Workbook::new().with_cell("CR", "E12", "100").unwrap();
        let out = extract_statements(&workbook, &ExtractionOptions::for_year(2024));
        let bilan: Vec<_> = out.warnings.iter().filter(|w| w.contains("Bilan")).collect();
        assert_eq!(bilan.len(), 1);
        assert!(out.warnings.iter().any(|w| w.contains("\"TFT\"")));
        assert_eq!(out.data.field_count(), 1);
    }

    #[test]
    fn test_garbage_cell_extracted_as_zero() {
        let workbook = Workbook::new()
            .with_cell("CR", "E12", "8000000")
            .and_then(|w| w.with_cell("CR", "E46", "#REF!"))
            .unwrap();
        let out = extract_statements(&workbook, &ExtractionOptions::for_year(2024));
        let n = out.data.get(YearKey::CURRENT).unwrap();
        assert_eq!(n.data.get(FieldKey::ResultatNet), Some(dec!(0)));
    }

    #[test]
    fn test_missing_sheet_lists_available_sheets() {
        let workbook = Workbook::new()
            .with_cell("Bilan", "E35", "100")
            .and_then(|w| w.with_cell("Compte de résultat", "E12", "50"))
            .unwrap();
        let out = extract_statements(&workbook, &ExtractionOptions::for_year(2024));
        assert_eq!(
            out.warnings[0],
            "Feuille \"CR\" non trouvée dans le classeur \
             (feuilles disponibles : Bilan, Compte de résultat)"
        );
    }

    #[test]
    fn test_empty_sheet_is_reported() {
        let mut workbook = Workbook::new().with_cell("CR", "E12", "100").unwrap();
        workbook.sheet_mut("Bilan");
        let out = extract_statements(&workbook, &ExtractionOptions::for_year(2024));
        let bilan: Vec<_> = out.warnings.iter().filter(|w| w.contains("Bilan")).collect();
        assert_eq!(bilan, vec!["Feuille \"Bilan\" vide dans le classeur"]);
        assert_eq!(out.data.field_count(), 1);
    }
}
