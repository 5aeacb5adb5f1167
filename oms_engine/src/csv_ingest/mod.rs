//! Streaming CSV ingestion.
//!
//! Staged files are read in fixed-size batches on a blocking thread and handed to the async side one batch at a time,
//! so a file is never held in memory as a whole. Headers are sanitised once and mapped to column indices; each data
//! row is then mapped to a [`NewOrder`](crate::db_types::NewOrder). Rows that cannot be mapped, validated or stored
//! are copied, untouched, into an invalid-rows file next to the other public downloads.
mod batch_reader;
mod columns;
mod invalid_rows;
mod sanitize;

pub use batch_reader::{open_batches, CsvBatchReader, CsvBatchStream};
pub use columns::{ColumnMap, RowError, REQUIRED_COLUMNS};
pub use invalid_rows::InvalidRowsWriter;
pub use sanitize::{sanitize_field, sanitize_header};
use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Error)]
pub enum CsvIngestError {
    #[error("Could not open {path}. {reason}")]
    OpenFailed { path: String, reason: String },
    #[error("The file has no header row")]
    MissingHeader,
    #[error("The header row is missing required columns: {0}")]
    MissingColumns(String),
    #[error("Could not read the next batch of rows. {0}")]
    ReadFailed(String),
    #[error("Could not write the invalid rows file. {0}")]
    InvalidRowsOutput(String),
}
