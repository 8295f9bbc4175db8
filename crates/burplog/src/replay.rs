//! Re-issuing captured requests.
//!
//! [`ReplaySpec`] works out what to send. Sending it is up to a
//! [`ReplayClient`]; [`replay`] ties the two together and records the result
//! on the original transaction.

use crate::headers::Headers;
use crate::record::{TransactionRecord, HTTP_CONTENT_LENGTH};
use tracing::debug;

/// Values replacing the captured request's own when replaying.
#[derive(Debug, Clone, Default)]
pub struct ReplayOverrides {
    pub url: Option<String>,
    pub method: Option<String>,
    pub body: Option<Vec<u8>>,
    pub headers: Option<Headers>,
}

impl ReplayOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// Effective request to send when replaying a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySpec {
    pub url: String,
    /// Empty when the captured request had no method
    pub method: String,
    pub body: Vec<u8>,
    pub headers: Headers,
}

impl ReplaySpec {
    /// Combine `overrides` with the captured request.
    ///
    /// Headers are copied, so editing the result never touches `record`. A
    /// POST with a non-empty body gets a `Content-Length` matching the
    /// effective body, replacing any existing value.
    pub fn from_record(record: &TransactionRecord, overrides: ReplayOverrides) -> Self {
        let url = overrides
            .url
            .unwrap_or_else(|| record.url_str().to_string());
        let method = overrides
            .method
            .unwrap_or_else(|| record.method().unwrap_or_default().to_string());
        let body = overrides.body.unwrap_or_else(|| record.body().to_vec());
        let mut headers = overrides.headers.unwrap_or_else(|| record.headers().clone());

        if method == "POST" && !body.is_empty() {
            headers.insert(HTTP_CONTENT_LENGTH, body.len().to_string());
        }

        Self {
            url,
            method,
            body,
            headers,
        }
    }
}

/// HTTP client that can execute a [`ReplaySpec`].
pub trait ReplayClient {
    type Error;

    /// Send the request and capture the exchange as a new transaction.
    fn execute(&self, spec: &ReplaySpec) -> Result<TransactionRecord, Self::Error>;
}

/// Replay `record` through `client`, appending the result to
/// [`TransactionRecord::replayed`].
///
/// On error nothing is appended.
pub fn replay<'r, C>(
    client: &C,
    record: &'r mut TransactionRecord,
    overrides: ReplayOverrides,
) -> Result<&'r TransactionRecord, C::Error>
where
    C: ReplayClient + ?Sized,
{
    let spec = ReplaySpec::from_record(record, overrides);
    debug!(
        index = record.index(),
        method = %spec.method,
        url = %spec.url,
        "replaying transaction"
    );

    let result = client.execute(&spec)?;
    Ok(record.push_replayed(result))
}
