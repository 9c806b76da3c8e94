//! Input and Output
//!
//! The merge engine neither parses nor persists anything. This module holds
//! the collaborators that sit on either side of it:
//! - CSV event reader (key, start, end columns)
//! - Window writer (table, CSV, JSON)

mod reader;
mod writer;

pub use reader::{EventReader, ImportReport};
pub use writer::{BoundFormat, OutputFormat, WindowWriter};

/// Errors that can occur while reading events or writing windows
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Could not parse bound: {0}")]
    ParseBound(String),

    #[error("Line {line}: {message}")]
    InvalidRow { line: usize, message: String },
}
