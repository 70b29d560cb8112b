//! BCEAO norm tables and ratio compliance classification.

pub mod norms;
pub mod scorer;

pub use norms::{NormEntry, NormSet, NormTable, Sector};
pub use scorer::{check_compliance, evaluate, ComplianceResult, ComplianceStatus};
