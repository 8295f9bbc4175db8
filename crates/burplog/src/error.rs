//! Error types for record normalization.

use std::path::PathBuf;

/// A raw record that cannot be turned into a transaction.
///
/// Only structural problems end up here. Unparsable dates, capture times and
/// Content-Length mismatches are absorbed during construction.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record {index} has no {section} section")]
    MissingSection { index: usize, section: &'static str },
}

/// A capture time that does not follow `hh:mm:ss AM|PM`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureTimeError {
    #[error("expected `hh:mm:ss AM|PM`, got {0:?}")]
    Malformed(String),
    #[error("{hour:02}:{minute:02}:{second:02} is not a valid time of day")]
    OutOfRange { hour: u32, minute: u32, second: u32 },
}

/// Errors that abort a whole batch.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of records, found {0}")]
    NotAnArray(&'static str),
}
