//! Error types for dtanalyze

use crate::detector::DetectorError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// dtanalyze errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Table parse error: {0}")]
    TableParse(String),

    /// Leading sequence-number cell is missing or not a positive integer
    #[error("Row {row}: first cell must hold the 1-based row number")]
    RowNumber { row: usize },

    #[error("Row {row}: expected {expected} cells, found {found}")]
    CellCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Cell data disagrees with the resolved type of its field
    #[error("Field '{field}': {source}")]
    Detector {
        field: String,
        #[source]
        source: DetectorError,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
