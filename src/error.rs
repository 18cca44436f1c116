//! Error types for the ingestion and aggregation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, aggregating or exporting readership data.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A source CSV file does not exist.
    #[error("source file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// A required column is absent from a source table.
    #[error("{table} table is missing required column '{column}'")]
    Schema { table: &'static str, column: String },

    /// An operation that needs at least one row was given none.
    #[error("cannot compute {0} over an empty table")]
    EmptyResult(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
