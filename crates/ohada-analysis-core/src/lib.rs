#[macro_use]
mod keys;

pub mod analysis;
pub mod compliance;
pub mod error;
pub mod extraction;
pub mod ratios;
pub mod scoring;
pub mod statements;
pub mod types;

pub use analysis::{
    analyze_extraction, analyze_workbook, calculate_analysis, AnalysisOptions, AnalysisOutput,
};
pub use compliance::{NormEntry, NormSet, Sector};
pub use error::OhadaError;
pub use extraction::{ExtractionOptions, ExtractionOutput, Workbook};
pub use ratios::{FinancialRatios, RatioKey};
pub use statements::{FieldKey, FinancialData, MultiyearData, YearKey, YearRecord};
pub use types::*;

/// Standard result type for all OHADA analysis operations
pub type OhadaResult<T> = Result<T, OhadaError>;
