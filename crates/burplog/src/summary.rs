//! Compact per-record view used for reporting.

use crate::record::TransactionRecord;
use chrono::{DateTime, FixedOffset, NaiveTime};
use serde::Serialize;
use std::fmt;

/// The fields of a [`TransactionRecord`] worth printing in a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub index: usize,
    pub method: Option<String>,
    pub url: String,
    pub status: u16,
    pub length: usize,
    pub capture_time: Option<NaiveTime>,
    pub response_date: Option<DateTime<FixedOffset>>,
    pub ip_address: Option<String>,
    pub secure: bool,
    pub ajax: bool,
    pub multipart: bool,
    pub replayed: usize,
}

impl From<&TransactionRecord> for RecordSummary {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            index: record.index(),
            method: record.method().map(str::to_string),
            url: record.url_str().to_string(),
            status: record.status(),
            length: record.len(),
            capture_time: record.capture_time(),
            response_date: record.response_date(),
            ip_address: record.ip_address().map(str::to_string),
            secure: record.is_secure(),
            ajax: record.is_ajax(),
            multipart: record.is_multipart(),
            replayed: record.replayed().len(),
        }
    }
}

impl RecordSummary {
    fn flags(&self) -> String {
        [
            (self.secure, "tls"),
            (self.ajax, "xhr"),
            (self.multipart, "multipart"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(",")
    }
}

impl fmt::Display for RecordSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self
            .capture_time
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());
        write!(
            f,
            "{:>5}  {time}  {:<7} {:>3} {:>8}  {}",
            self.index,
            self.method.as_deref().unwrap_or("-"),
            self.status,
            self.length,
            self.url,
        )?;
        let flags = self.flags();
        if !flags.is_empty() {
            write!(f, "  [{flags}]")?;
        }
        Ok(())
    }
}
