//! Input schema for tokenized proxy log entries.
//!
//! These types mirror what the log reader emits. Every key is optional and
//! missing keys fall back to defaults during normalization.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// One tokenized log entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Capture time as recorded by the proxy, e.g. `"01:15:30 PM"`
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub request: Option<RawRequest>,
    #[serde(default)]
    pub response: Option<RawResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRequest {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub headers: RawHeaders,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: Option<u16>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub headers: RawHeaders,
    #[serde(default)]
    pub body: Option<String>,
}

/// Headers as the log reader hands them over.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawHeaders {
    /// `{"Content-Type": "text/html"}`
    Map(HashMap<String, String>),
    /// `[["Content-Type", "text/html"]]`, order preserved
    Pairs(Vec<(String, String)>),
    /// `"Content-Type: text/html\r\nHost: example.com"`
    Block(String),
}

impl Default for RawHeaders {
    fn default() -> Self {
        RawHeaders::Map(HashMap::new())
    }
}

impl From<Vec<(String, String)>> for RawHeaders {
    fn from(pairs: Vec<(String, String)>) -> Self {
        RawHeaders::Pairs(pairs)
    }
}

impl From<&str> for RawHeaders {
    fn from(block: &str) -> Self {
        RawHeaders::Block(block.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusValue {
    Code(u16),
    Text(String),
}

/// Accept the status as a number or as a numeric string.
fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StatusValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StatusValue::Code(code)) => Ok(Some(code)),
        Some(StatusValue::Text(text)) => text
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid status {text:?}: {e}"))),
    }
}
