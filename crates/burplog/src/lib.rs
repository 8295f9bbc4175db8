//! Normalization of HTTP transactions captured by an intercepting proxy.
//!
//! A proxy log reader hands over loosely structured entries. This crate turns
//! each one into a [`TransactionRecord`] with the following guarantees:
//! - Header names are canonical
//! - Bodies are trimmed to their declared Content-Length
//! - The capture time and response `Date` are parsed
//! - The URL is resolved and request parameters are extracted
//!
//! # Example
//!
//! ```no_run
//! use burplog::{normalize_file, ReplayOverrides, ReplaySpec};
//! use std::path::Path;
//!
//! let batch = normalize_file(Path::new("proxy-log.json")).unwrap();
//!
//! for record in batch.records.iter().filter(|r| r.is_post()) {
//!     let spec = ReplaySpec::from_record(record, ReplayOverrides::new());
//!     println!("{} {} ({} bytes)", spec.method, spec.url, spec.body.len());
//! }
//! ```

mod config;
mod error;
mod headers;
mod parser;
mod raw;
mod record;
mod replay;
mod summary;
mod target;
mod timestamp;

use std::path::Path;
use tracing::warn;

pub use config::{Config, Format};
pub use error::{CaptureTimeError, LogError, RecordError};
pub use headers::{canonical_name, Headers};
pub use parser::{DefaultParser, MessageParser, Parameters};
pub use raw::{RawHeaders, RawRequest, RawResponse, RawTransaction};
pub use record::{
    Request, Response, TransactionRecord, HTTP_CONTENT_LENGTH, HTTP_CONTENT_TYPE, HTTP_DATE,
    HTTP_X_REQUESTED_WITH,
};
pub use replay::{replay, ReplayClient, ReplayOverrides, ReplaySpec};
pub use summary::RecordSummary;
pub use target::RequestUrl;
pub use timestamp::{parse_capture_time, parse_http_date};

/// A log entry that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Position of the entry in the log
    pub index: usize,
    pub reason: String,
}

/// Result of normalizing a whole log.
#[derive(Debug, Default)]
pub struct LogBatch {
    pub records: Vec<TransactionRecord>,
    pub skipped: Vec<SkippedEntry>,
}

impl LogBatch {
    /// True when every entry was normalized.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, index: usize, reason: String) {
        warn!(index, %reason, "skipping log entry");
        self.skipped.push(SkippedEntry { index, reason });
    }
}

/// Normalize every entry of a JSON array of tokenized records.
///
/// Each entry's array position becomes its index. A `null` entry yields an
/// empty placeholder. Entries that fail to deserialize or lack a
/// `request`/`response` section are skipped and the rest are still processed.
pub fn normalize_json(json: &str) -> Result<LogBatch, LogError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    normalize_value(value)
}

/// Normalize an already parsed JSON array. See [`normalize_json`].
pub fn normalize_value(value: serde_json::Value) -> Result<LogBatch, LogError> {
    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        other => return Err(LogError::NotAnArray(json_kind(&other))),
    };

    let mut batch = LogBatch::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let raw = match serde_json::from_value::<Option<RawTransaction>>(entry) {
            Ok(raw) => raw,
            Err(e) => {
                batch.skip(index, format!("invalid entry: {e}"));
                continue;
            }
        };

        match TransactionRecord::from_raw(raw, index) {
            Ok(record) => batch.records.push(record),
            Err(e) => batch.skip(index, e.to_string()),
        }
    }

    Ok(batch)
}

/// Read and normalize a JSON log export. See [`normalize_json`].
pub fn normalize_file(path: &Path) -> Result<LogBatch, LogError> {
    let content = std::fs::read_to_string(path).map_err(|source| LogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    normalize_json(&content)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
