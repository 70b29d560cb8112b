use thiserror::Error;

#[derive(Debug, Error)]
pub enum OhadaError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("No data to analyze: {0}")]
    NoData(String),

    #[error("Extraction failed: {}", warnings.join("; "))]
    ExtractionFailed { warnings: Vec<String> },

    #[error("Invalid year key '{0}': expected \"N\" or \"N-k\"")]
    InvalidYearKey(String),

    #[error("Invalid year mapping: {0}")]
    InvalidYearMapping(String),

    #[error("Invalid cell address '{0}'")]
    InvalidCellAddress(String),

    #[error("Unknown {kind} '{name}'")]
    UnknownField { kind: &'static str, name: String },

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for OhadaError {
    fn from(e: serde_json::Error) -> Self {
        OhadaError::SerializationError(e.to_string())
    }
}
