//! Manual entry form producer.
//!
//! The form is the JSON the entry wizard posts: year key → field name →
//! amount, where amounts are numbers or user-typed strings.

use log::info;
use serde_json::Value;
use std::collections::BTreeMap;

use super::parser::{parse_float, parse_text};
use super::{finalize, ExtractionOptions, ExtractionOutput};
use crate::statements::{FieldKey, MultiyearData, YearKey};
use crate::types::Money;

/// `"N"` / `"N-1"` → field name → amount.
pub type ManualForm = BTreeMap<String, BTreeMap<String, Value>>;

/// Convert a manual entry form. Unknown year keys, unknown field names and
/// non-numeric values become warnings; empty entries are skipped.
pub fn extract_from_form(form: &ManualForm, options: &ExtractionOptions) -> ExtractionOutput {
    let mut data = MultiyearData::new();
    let mut warnings = Vec::new();

    for (raw_key, fields) in form {
        let key: YearKey = match raw_key.parse() {
            Ok(key) => key,
            Err(_) => {
                warnings.push(format!("Clé d'année inconnue \"{raw_key}\" ignorée"));
                continue;
            }
        };
        if !options.accepts(key.year_for(options.reference_year)) {
            continue;
        }

        for (name, value) in fields {
            let field: FieldKey = match name.parse() {
                Ok(field) => field,
                Err(_) => {
                    warnings.push(format!("Champ inconnu \"{name}\" ({key}) ignoré"));
                    continue;
                }
            };
            let amount = match form_amount(value) {
                Ok(Some(amount)) => amount,
                Ok(None) => continue,
                Err(()) => {
                    warnings.push(format!("Valeur non numérique pour {field} ({key}) ignorée"));
                    continue;
                }
            };
            match data.entry(key, options.reference_year) {
                Ok(record) => {
                    record.data.set(field, amount);
                }
                Err(e) => {
                    warnings.push(format!("{key}: {e}"));
                    break;
                }
            }
        }
    }

    let output = finalize(data, warnings);
    info!(
        "manual form: {} field(s) over {} year(s), {} warning(s)",
        output.data.field_count(),
        output.data.len(),
        output.warnings.len()
    );
    output
}

/// `Ok(None)` for blank entries, `Err` for values that cannot be amounts.
fn form_amount(value: &Value) -> Result<Option<Money>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(parse_text(s))),
        Value::Number(n) => Ok(Some(match n.as_i64() {
            Some(i) => Money::from(i),
            None => parse_float(n.as_f64().unwrap_or_default()),
        })),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(()),
    }
}
