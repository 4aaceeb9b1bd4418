//! Employee Dataset Ingestion
//!
//! Reads uploaded or on-disk tables into raw records for the aligner.

mod table;

pub use table::{Dataset, UploadFormat, TARGET_COLUMN};

use thiserror::Error;

/// Dataset errors
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Excel error: {0}")]
    Excel(#[from] calamine::XlsxError),
    #[error("Unsupported file format: {0} (upload a .csv or .xlsx file)")]
    UnsupportedFormat(String),
    #[error("File has no header row")]
    MissingHeader,
}
