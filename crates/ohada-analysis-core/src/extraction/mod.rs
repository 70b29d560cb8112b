//! Input producers. Spreadsheet, manual form and OCR text all yield the same
//! [`ExtractionOutput`]: best-effort `MultiyearData` plus advisory warnings.

pub mod cell_map;
pub mod extractor;
pub mod manual;
pub mod parser;
#[cfg(feature = "text")]
pub mod text;
pub mod workbook;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::OhadaError;
use crate::statements::{FieldKey, MultiyearData};
use crate::OhadaResult;

pub use extractor::extract_statements;
pub use parser::{parse_cell, parse_text};
pub use workbook::{CellAddress, CellValue, Workbook};

/// Fields whose non-zero presence distinguishes real statements from the
/// blank template.
const SIGNIFICANT_FIELDS: [FieldKey; 4] = [
    FieldKey::ChiffreAffaires,
    FieldKey::TotalActif,
    FieldKey::CapitauxPropres,
    FieldKey::ResultatNet,
];

pub const NO_DATA_WARNING: &str = "Aucune donnée exploitable n'a pu être extraite du classeur";

pub const TEMPLATE_WARNING: &str = "Les montants clés (chiffre d'affaires, total actif, capitaux \
     propres, résultat net) sont tous nuls ou absents : le fichier semble être un modèle vierge";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// Calendar year of period `N`.
    pub reference_year: i32,
    /// Inclusive `[start, end]` filter on calendar years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_range: Option<(i32, i32)>,
}

impl ExtractionOptions {
    pub fn for_year(reference_year: i32) -> Self {
        Self {
            reference_year,
            year_range: None,
        }
    }

    pub fn with_year_range(mut self, start: i32, end: i32) -> Self {
        self.year_range = Some((start, end));
        self
    }

    /// Reject an inverted year range.
    pub fn validate(&self) -> OhadaResult<()> {
        match self.year_range {
            Some((start, end)) if start > end => Err(OhadaError::InvalidInput {
                field: "year_range".into(),
                reason: format!("start {start} is after end {end}"),
            }),
            _ => Ok(()),
        }
    }

    pub fn accepts(&self, year: i32) -> bool {
        self.year_range
            .map_or(true, |(start, end)| (start..=end).contains(&year))
    }
}

impl Default for ExtractionOptions {
    /// The last closed fiscal year.
    fn default() -> Self {
        Self::for_year(chrono::Local::now().year() - 1)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub data: MultiyearData,
    pub warnings: Vec<String>,
}

impl ExtractionOutput {
    /// True when nothing usable was extracted.
    pub fn is_empty(&self) -> bool {
        self.data.field_count() == 0
    }
}

/// Post-extraction validation shared by every producer.
pub(crate) fn finalize(data: MultiyearData, mut warnings: Vec<String>) -> ExtractionOutput {
    if data.field_count() == 0 {
        log::warn!("extraction produced no field");
        warnings.push(NO_DATA_WARNING.to_string());
        return ExtractionOutput {
            data: MultiyearData::new(),
            warnings,
        };
    }

    let looks_filled = data
        .iter()
        .any(|(_, record)| SIGNIFICANT_FIELDS.iter().any(|f| record.data.is_nonzero(*f)));
    if !looks_filled {
        log::warn!("significant fields are all zero or missing; blank template suspected");
        warnings.push(TEMPLATE_WARNING.to_string());
    }

    ExtractionOutput { data, warnings }
}
