//! In-memory workbook model.
//!
//! Extraction only ever reads single cells at fixed coordinates, so a sheet
//! is a sparse map from address to value. With the `xlsx` feature a workbook
//! can be loaded from any format calamine understands.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::OhadaError;
use crate::OhadaResult;

// ---------------------------------------------------------------------------
// Cell addresses
// ---------------------------------------------------------------------------

/// Zero-based cell coordinate, written in A1 notation (`E35` is row 34,
/// column 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Single-letter column and one-based row, as printed on the template.
    pub const fn a1(column: char, row: u32) -> Self {
        Self {
            row: row - 1,
            col: column as u32 - 'A' as u32,
        }
    }

    fn column_name(&self) -> String {
        let mut n = self.col + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_name(), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = OhadaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OhadaError::InvalidCellAddress(s.to_string());
        let trimmed = s.trim().trim_start_matches('$');
        let split = trimmed
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or_else(invalid)?;
        let (letters, digits) = trimmed.split_at(split);
        if letters.is_empty() || letters.len() > 3 {
            return Err(invalid());
        }

        let col = letters
            .chars()
            .map(|c| c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
            .fold(0u32, |acc, d| acc * 26 + d);
        let row: u32 = digits
            .trim_start_matches('$')
            .parse()
            .map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }
        Ok(CellAddress::new(row - 1, col - 1))
    }
}

impl Serialize for CellAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Cells and sheets
// ---------------------------------------------------------------------------

/// A raw cell value, before amount parsing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sheet {
    cells: HashMap<CellAddress, CellValue>,
}

impl Sheet {
    pub fn get(&self, address: CellAddress) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&address).unwrap_or(&EMPTY)
    }

    pub fn set(&mut self, address: CellAddress, value: impl Into<CellValue>) {
        let value = value.into();
        if value == CellValue::Empty {
            self.cells.remove(&address);
        } else {
            self.cells.insert(address, value);
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Named sheets.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: BTreeMap<String, Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    /// Get or create a sheet.
    pub fn sheet_mut(&mut self, name: &str) -> &mut Sheet {
        self.sheets.entry(name.to_string()).or_default()
    }

    /// Set a cell by A1 address.
    pub fn set_cell(
        &mut self,
        sheet: &str,
        address: &str,
        value: impl Into<CellValue>,
    ) -> OhadaResult<()> {
        let address: CellAddress = address.parse()?;
        self.sheet_mut(sheet).set(address, value);
        Ok(())
    }

    /// Builder-style [`Workbook::set_cell`].
    pub fn with_cell(
        mut self,
        sheet: &str,
        address: &str,
        value: impl Into<CellValue>,
    ) -> OhadaResult<Self> {
        self.set_cell(sheet, address, value)?;
        Ok(self)
    }

    /// Load every sheet of an `.xlsx`, `.xlsm`, `.xlsb`, `.xls` or `.ods` file.
    #[cfg(feature = "xlsx")]
    pub fn open(path: impl AsRef<std::path::Path>) -> OhadaResult<Self> {
        use calamine::{open_workbook_auto, Data, Reader};

        let path = path.as_ref();
        let mut source = open_workbook_auto(path)
            .map_err(|e| OhadaError::Workbook(format!("{}: {e}", path.display())))?;

        let mut workbook = Workbook::new();
        for name in source.sheet_names() {
            let range = source
                .worksheet_range(&name)
                .map_err(|e| OhadaError::Workbook(format!("sheet \"{name}\": {e}")))?;
            let (row0, col0) = range.start().unwrap_or((0, 0));
            let sheet = workbook.sheet_mut(&name);
            for (row, col, cell) in range.used_cells() {
                let value = match cell {
                    Data::Empty => continue,
                    Data::Int(i) => CellValue::Int(*i),
                    Data::Float(f) => CellValue::Float(*f),
                    Data::Bool(b) => CellValue::Bool(*b),
                    Data::String(s) => CellValue::Text(s.clone()),
                    other => CellValue::Text(other.to_string()),
                };
                sheet.set(CellAddress::new(row0 + row as u32, col0 + col as u32), value);
            }
            log::debug!("loaded sheet \"{name}\" ({} cells)", sheet.len());
        }
        Ok(workbook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_and_display() {
        let e35: CellAddress = "E35".parse().unwrap();
        assert_eq!(e35, CellAddress::new(34, 4));
        assert_eq!(e35, CellAddress::a1('E', 35));
        assert_eq!(e35.to_string(), "E35");

        let aa1: CellAddress = "AA1".parse().unwrap();
        assert_eq!(aa1, CellAddress::new(0, 26));
        assert_eq!(aa1.to_string(), "AA1");

        assert_eq!("$J$12".parse::<CellAddress>().unwrap(), CellAddress::a1('J', 12));
    }

    #[test]
    fn test_invalid_addresses() {
        for bad in ["", "35", "E", "E0", "E-1", "ABCD1", "E3X"] {
            assert!(bad.parse::<CellAddress>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_missing_cell_reads_empty() {
        let workbook = Workbook::new().with_cell("Bilan", "E35", "100").unwrap();
        let sheet = workbook.sheet("Bilan").unwrap();
        assert_eq!(sheet.get(CellAddress::a1('E', 35)), &CellValue::Text("100".into()));
        assert_eq!(sheet.get(CellAddress::a1('F', 35)), &CellValue::Empty);
        assert!(workbook.sheet("CR").is_none());
    }
}
