use std::path::PathBuf;

use crate::duplex_structs::SampleId;

/// Errors that can occur in duplexranges.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    Parameter(String),

    #[error("coordinate error in sample {sample}, record {record}: {detail}")]
    Coordinate {
        sample: SampleId,
        record: String,
        detail: String,
    },

    #[error("sample {sample} has no records left after {stage}")]
    EmptySubset { sample: SampleId, stage: &'static str },

    #[error("sample {sample}: requested {requested} records but only {available} are available")]
    SampleSize {
        sample: SampleId,
        requested: usize,
        available: usize,
    },

    #[error("dense {what} needs {bytes} bytes, above the limit of {limit}; use the sparse layout")]
    MatrixTooLarge {
        what: &'static str,
        bytes: u128,
        limit: u64,
    },

    #[error("malformed record at row {row} of {path}: {detail}")]
    Malformed {
        path: PathBuf,
        row: usize,
        detail: String,
    },

    #[error("I/O error: {source} ({path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("table error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl Error {
    /// Convenience for wrapping an `io::Error` with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    pub(crate) fn coordinate(
        sample: &SampleId,
        record: &str,
        detail: impl Into<String>,
    ) -> Self {
        Self::Coordinate {
            sample: sample.clone(),
            record: record.to_string(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
