//! Alignment Error Types

use thiserror::Error;

/// Errors while building schemas or tables
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentError {
    /// Schema has no columns
    #[error("Feature schema is empty")]
    EmptySchema,

    /// Column listed twice in the schema
    #[error("Duplicate column in feature schema: {0}")]
    DuplicateColumn(String),

    /// Column length disagrees with the table's row count
    #[error("Column {column} has {actual} values, table has {expected} rows")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
}
