//! Normalized request/response transactions.

use crate::error::RecordError;
use crate::headers::Headers;
use crate::parser::{DefaultParser, MessageParser, Parameters};
use crate::raw::RawTransaction;
use crate::target::RequestUrl;
use crate::timestamp::{parse_capture_time, parse_http_date};
use chrono::{DateTime, FixedOffset, NaiveTime};
use std::fmt;
use tracing::{debug, warn};

pub const HTTP_X_REQUESTED_WITH: &str = "X-Requested-With";
pub const HTTP_CONTENT_TYPE: &str = "Content-Type";
pub const HTTP_CONTENT_LENGTH: &str = "Content-Length";
pub const HTTP_DATE: &str = "Date";

/// Marker for AMF payloads, whose logged body does not match Content-Length
const AMF_MARKER: &str = "amf";

/// Request half of a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: Option<String>,
    pub path: Option<String>,
    pub version: Option<String>,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// Response half of a transaction. `status` is 0 when nothing was logged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub version: Option<String>,
    pub status: u16,
    pub reason: Option<String>,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// One captured request and its response, plus the proxy's metadata.
///
/// Built once from a [`RawTransaction`]. The request and response are
/// read-only afterwards; only the list of replay results grows.
#[derive(Debug, Clone, Default)]
pub struct TransactionRecord {
    index: usize,
    host: Option<String>,
    ip_address: Option<String>,
    capture_time: Option<NaiveTime>,
    response_date: Option<DateTime<FixedOffset>>,
    request: Request,
    response: Response,
    url: Option<RequestUrl>,
    parameters: Parameters,
    replayed: Vec<TransactionRecord>,
}

impl TransactionRecord {
    /// Placeholder record with every field at its default.
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Normalize a raw log entry with the [`DefaultParser`].
    ///
    /// `None` yields [`TransactionRecord::empty`].
    pub fn from_raw(raw: Option<RawTransaction>, index: usize) -> Result<Self, RecordError> {
        Self::from_raw_with(raw, index, &DefaultParser)
    }

    /// Normalize a raw log entry.
    ///
    /// Missing fields fall back to defaults and unparsable dates are logged
    /// and dropped. Fails only when the `request` or `response` section is
    /// missing altogether.
    pub fn from_raw_with<P>(
        raw: Option<RawTransaction>,
        index: usize,
        parser: &P,
    ) -> Result<Self, RecordError>
    where
        P: MessageParser + ?Sized,
    {
        let _span = tracing::debug_span!("transaction", index).entered();

        let Some(raw) = raw else {
            debug!("created empty transaction");
            return Ok(Self::empty(index));
        };

        let RawTransaction {
            host,
            ip_address,
            time,
            request,
            response,
        } = raw;
        let request = request.ok_or(RecordError::MissingSection {
            index,
            section: "request",
        })?;
        let response = response.ok_or(RecordError::MissingSection {
            index,
            section: "response",
        })?;

        let mut record = Self {
            index,
            host,
            ip_address,
            request: Request {
                method: request.method,
                path: request.path,
                version: request.version,
                headers: parser.parse_headers(&request.headers),
                body: request.body.unwrap_or_default().into_bytes(),
            },
            response: Response {
                version: response.version,
                status: response.status.unwrap_or(0),
                reason: response.reason,
                headers: parser.parse_headers(&response.headers),
                body: response.body.unwrap_or_default().into_bytes(),
            },
            ..Default::default()
        };

        // The Date header is only an approximation of when the response was
        // generated; cached responses carry stale dates.
        record.response_date = record
            .response_header(HTTP_DATE)
            .and_then(|date| match parse_http_date(date) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!(date, error = %e, "invalid response Date header");
                    None
                }
            });

        record.capture_time = time
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .and_then(|t| match parse_capture_time(t) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!(time = t, error = %e, "invalid capture time");
                    None
                }
            });

        let path = record.request.path.as_deref().unwrap_or("/");
        record.url = Some(RequestUrl::resolve(record.host.as_deref(), path));
        record.parameters = parser.parse_parameters(&record);

        // Log parsing can pick up a trailing CRLF or two past the real body.
        reconcile_length(&mut record.response.body, &record.response.headers, "response");
        if record.is_amf_request() {
            debug!(
                actual = record.request.body.len(),
                "AMF request, Content-Length check skipped"
            );
        } else {
            reconcile_length(&mut record.request.body, &record.request.headers, "request");
        }

        debug!(url = %record.url_str(), status = record.status(), "created transaction");
        Ok(record)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// Time of day the proxy captured the transaction
    pub fn capture_time(&self) -> Option<NaiveTime> {
        self.capture_time
    }

    /// Parsed response `Date` header
    pub fn response_date(&self) -> Option<DateTime<FixedOffset>> {
        self.response_date
    }

    pub fn url(&self) -> Option<&RequestUrl> {
        self.url.as_ref()
    }

    /// Resolved URL as text, empty for a placeholder record
    pub fn url_str(&self) -> &str {
        self.url.as_ref().map(RequestUrl::as_str).unwrap_or_default()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    // ===== Request accessors =====

    pub fn method(&self) -> Option<&str> {
        self.request.method.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.request.path.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.request.version.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        &self.request.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.request.body
    }

    /// Request header by name, in any case.
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request.headers.get(name)
    }

    // ===== Response accessors =====

    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn reason(&self) -> Option<&str> {
        self.response.reason.as_deref()
    }

    pub fn response_version(&self) -> Option<&str> {
        self.response.version.as_deref()
    }

    pub fn response_headers(&self) -> &Headers {
        &self.response.headers
    }

    pub fn response_body(&self) -> &[u8] {
        &self.response.body
    }

    /// Response header by name, in any case.
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response.headers.get(name)
    }

    /// Length of the response body
    pub fn len(&self) -> usize {
        self.response.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.response.body.is_empty()
    }

    // ===== Replays =====

    /// Results of replaying this request, oldest first
    pub fn replayed(&self) -> &[TransactionRecord] {
        &self.replayed
    }

    /// Append a replay result and return it.
    pub fn push_replayed(&mut self, result: TransactionRecord) -> &TransactionRecord {
        let slot = self.replayed.len();
        self.replayed.push(result);
        &self.replayed[slot]
    }

    // ===== Predicates =====

    /// Request went over HTTPS.
    pub fn is_secure(&self) -> bool {
        self.url
            .as_ref()
            .and_then(RequestUrl::scheme)
            .is_some_and(|scheme| scheme == "https")
    }

    /// Request was made through XMLHttpRequest.
    pub fn is_ajax(&self) -> bool {
        self.request.headers.contains(HTTP_X_REQUESTED_WITH)
    }

    /// Request carries a multipart body (RFC 2388).
    pub fn is_multipart(&self) -> bool {
        self.request_header(HTTP_CONTENT_TYPE)
            .is_some_and(|ct| ct.starts_with("multipart/"))
    }

    pub fn is_get(&self) -> bool {
        self.method_is("GET")
    }

    pub fn is_post(&self) -> bool {
        self.method_is("POST")
    }

    pub fn is_put(&self) -> bool {
        self.method_is("PUT")
    }

    pub fn is_delete(&self) -> bool {
        self.method_is("DELETE")
    }

    pub fn is_options(&self) -> bool {
        self.method_is("OPTIONS")
    }

    pub fn is_trace(&self) -> bool {
        self.method_is("TRACE")
    }

    fn method_is(&self, verb: &str) -> bool {
        self.method() == Some(verb)
    }

    /// AMF payloads are flagged in the request's Content-Length value itself.
    fn is_amf_request(&self) -> bool {
        self.request_header(HTTP_CONTENT_LENGTH)
            .is_some_and(|value| value.contains(AMF_MARKER))
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Transaction {}>", self.index)
    }
}

/// Cut `body` down to the declared Content-Length. Never pads.
fn reconcile_length(body: &mut Vec<u8>, headers: &Headers, side: &'static str) {
    let Some(declared) = headers.get(HTTP_CONTENT_LENGTH) else {
        return;
    };
    match declared.trim().parse::<usize>() {
        Ok(length) if body.len() > length => {
            debug!(side, declared = length, actual = body.len(), "truncating body");
            body.truncate(length);
        }
        Ok(_) => {}
        Err(_) => debug!(side, declared, "non-numeric Content-Length"),
    }
}
