//! Error types for Harmona

use crate::types::Source;
use thiserror::Error;

/// Errors that can occur during harmonization
#[derive(Debug, Error)]
pub enum HarmonizeError {
    #[error("Failed to read source export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing expected column '{column}' in {source} export")]
    MissingColumn { source: Source, column: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
