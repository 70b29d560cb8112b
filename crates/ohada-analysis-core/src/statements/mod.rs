//! Normalized statement records: the field vocabulary, per-year records and
//! the multi-year container every input producer yields.

pub mod derived;
pub mod fields;
pub mod multiyear;

pub use derived::{derive_all, derive_fields};
pub use fields::{FieldKey, FinancialData};
pub use multiyear::{MultiyearData, YearKey, YearRecord};
