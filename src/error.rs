//! Error types for dataset scanning, querying, and rewriting.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by [`crate::dataset::DataFile`] and the modules behind it.
#[derive(Debug, Error)]
pub enum Error {
    /// Input path does not exist (or is not a regular file) at open time.
    #[error("{path:?} does not exist")]
    NotFound { path: PathBuf },

    /// Input file has no header row.
    #[error("{path:?} has no header row")]
    MissingHeader { path: PathBuf },

    /// Column referenced by a predicate or update target is absent from the header.
    #[error("'{column}' is not a valid column name")]
    UnknownColumn { column: String },

    /// Relationship value is not a categorical value of the source column.
    #[error("'{value}' is not a categorical value of '{column}'")]
    UnknownValue { value: String, column: String },

    /// Numeric conversion of a string that does not denote a single number.
    #[error("cannot convert '{value}' to a number")]
    Conversion { value: String },

    #[error("invalid predicate '{expression}': {reason}")]
    InvalidPredicate { expression: String, reason: String },

    #[error("unknown encoding '{label}'")]
    UnknownEncoding { label: String },

    #[error("failed to decode text with encoding {encoding}")]
    Decode { encoding: &'static str },

    #[error("I/O failure on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV failure on {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }
}
