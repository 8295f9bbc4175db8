//! Header and parameter parsing used during normalization.
//!
//! [`MessageParser`] is the seam between the record normalizer and the
//! low-level parsing rules. [`DefaultParser`] handles the common cases:
//! - Header maps, `[name, value]` lists and raw `Name: value` blocks
//! - Query strings and `application/x-www-form-urlencoded` bodies
//! - `multipart/form-data` field names

use crate::headers::Headers;
use crate::raw::RawHeaders;
use crate::record::TransactionRecord;
use serde::Serialize;
use std::collections::BTreeMap;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Request parameters grouped by where they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parameters {
    /// Parameters from the URL query string
    pub query: BTreeMap<String, Vec<String>>,
    /// Parameters from the request body
    pub body: BTreeMap<String, Vec<String>>,
}

impl Parameters {
    /// First query value for `name`
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name)?.first().map(String::as_str)
    }

    /// First body value for `name`
    pub fn body_value(&self, name: &str) -> Option<&str> {
        self.body.get(name)?.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.body.is_empty()
    }
}

/// Parsing rules consumed by [`TransactionRecord`] construction.
pub trait MessageParser {
    /// Turn headers as logged into a canonical mapping.
    fn parse_headers(&self, raw: &RawHeaders) -> Headers;

    /// Extract parameters from an already normalized request.
    fn parse_parameters(&self, record: &TransactionRecord) -> Parameters;
}

/// Parser for the formats the proxy log actually contains.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

impl MessageParser for DefaultParser {
    fn parse_headers(&self, raw: &RawHeaders) -> Headers {
        match raw {
            RawHeaders::Map(map) => map.iter().map(|(k, v)| (k, v.trim())).collect(),
            RawHeaders::Pairs(pairs) => pairs.iter().map(|(k, v)| (k, v.trim())).collect(),
            RawHeaders::Block(block) => parse_header_block(block),
        }
    }

    fn parse_parameters(&self, record: &TransactionRecord) -> Parameters {
        let mut params = Parameters::default();

        if let Some(query) = record.url().and_then(|url| url.query()) {
            parse_form_into(query, &mut params.query);
        }

        let body = record.body();
        if body.is_empty() {
            return params;
        }

        let content_type = record.request_header("Content-Type").unwrap_or_default();
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if media_type == FORM_URLENCODED || (media_type.is_empty() && record.is_post()) {
            parse_form_into(&String::from_utf8_lossy(body), &mut params.body);
        } else if media_type == MULTIPART_FORM_DATA {
            match boundary(content_type) {
                Some(boundary) => parse_multipart_into(body, boundary, &mut params.body),
                None => tracing::debug!(content_type, "multipart request without boundary"),
            }
        }

        params
    }
}

/// Parse `Name: value` lines. Lines without a colon are skipped.
fn parse_header_block(block: &str) -> Headers {
    block
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name, value.trim()))
        .collect()
}

/// Decode `a=1&b=two+words` pairs into `out`.
fn parse_form_into(input: &str, out: &mut BTreeMap<String, Vec<String>>) {
    for pair in input.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        out.entry(decode_component(key))
            .or_default()
            .push(decode_component(value));
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Boundary parameter of a multipart Content-Type, quotes stripped.
fn boundary(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Collect the fields of a multipart body. File parts map to their filename.
fn parse_multipart_into(body: &[u8], boundary: &str, out: &mut BTreeMap<String, Vec<String>>) {
    let text = String::from_utf8_lossy(body);
    let delimiter = format!("--{boundary}");

    for part in text.split(delimiter.as_str()).skip(1) {
        if part.starts_with("--") {
            break;
        }
        let part = part.trim_start_matches(['\r', '\n']);
        let Some((head, content)) = split_part(part) else {
            continue;
        };

        let part_headers = parse_header_block(head);
        let Some(disposition) = part_headers.get("Content-Disposition") else {
            continue;
        };
        let Some(name) = disposition_param(disposition, "name") else {
            continue;
        };

        let value = match disposition_param(disposition, "filename") {
            Some(filename) => filename.to_string(),
            None => content.trim_end_matches(['\r', '\n']).to_string(),
        };
        out.entry(name.to_string()).or_default().push(value);
    }
}

fn split_part(part: &str) -> Option<(&str, &str)> {
    part.split_once("\r\n\r\n").or_else(|| part.split_once("\n\n"))
}

fn disposition_param<'a>(disposition: &'a str, key: &str) -> Option<&'a str> {
    disposition
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim().trim_matches('"'))
}
