//! Integration tests for normalizing whole proxy log exports.

use burplog::{
    normalize_file, normalize_json, replay, LogError, RecordSummary, ReplayClient,
    ReplayOverrides, ReplaySpec, RequestUrl, TransactionRecord,
};
use chrono::{NaiveTime, TimeZone, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_fixture_log_is_normalized() {
    let batch = normalize_file(&fixture("proxy_log.json")).unwrap();

    let indices: Vec<usize> = batch.records.iter().map(|r| r.index()).collect();
    assert_eq!(indices, vec![0, 1, 3, 5]);

    let skipped: Vec<usize> = batch.skipped.iter().map(|s| s.index).collect();
    assert_eq!(skipped, vec![2, 4]);
    assert!(batch.skipped[0].reason.contains("no response section"));
    assert!(batch.skipped[1].reason.contains("invalid entry"));
    assert!(!batch.is_complete());
}

#[test]
fn test_fixture_get_request() {
    let batch = normalize_file(&fixture("proxy_log.json")).unwrap();
    let record = &batch.records[0];

    assert!(record.is_get());
    assert!(record.is_secure());
    assert!(!record.is_ajax());
    assert_eq!(
        record.url_str(),
        "https://www.example.com/search?q=burp+suite&page=2"
    );
    assert_eq!(record.parameters().query_value("q"), Some("burp suite"));
    assert_eq!(record.parameters().query_value("page"), Some("2"));
    assert_eq!(record.capture_time(), NaiveTime::from_hms_opt(10, 42, 7));
    assert_eq!(
        record.response_date().unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 2, 10, 42, 7).unwrap()
    );
    assert_eq!(record.response_body(), b"<html></html>");
    assert_eq!(record.response_header("content-type"), Some("text/html"));
}

#[test]
fn test_fixture_post_request() {
    let batch = normalize_file(&fixture("proxy_log.json")).unwrap();
    let record = &batch.records[1];

    assert!(record.is_post());
    assert!(record.is_ajax());
    assert!(!record.is_secure());
    assert_eq!(record.status(), 302);
    assert_eq!(record.reason(), Some("Found"));
    assert_eq!(record.response_date(), None);
    assert_eq!(record.capture_time(), NaiveTime::from_hms_opt(12, 5, 0));
    assert_eq!(record.body(), b"username=admin&password=s3cr3t");
    assert_eq!(record.parameters().body_value("password"), Some("s3cr3t"));
    assert_eq!(record.response_header("LOCATION"), Some("/home"));
}

#[test]
fn test_fixture_placeholder_and_relative_entries() {
    let batch = normalize_file(&fixture("proxy_log.json")).unwrap();

    let placeholder = &batch.records[2];
    assert_eq!(placeholder.index(), 3);
    assert_eq!(placeholder.url(), None);
    assert_eq!(placeholder.method(), None);

    let hostless = &batch.records[3];
    assert!(hostless.is_delete());
    assert_eq!(hostless.status(), 204);
    assert_eq!(
        hostless.url(),
        Some(&RequestUrl::Relative("/api/items/7".to_string()))
    );
    assert!(!hostless.is_secure());
}

#[test]
fn test_summaries_serialize() {
    let batch = normalize_file(&fixture("proxy_log.json")).unwrap();
    let summaries: Vec<RecordSummary> = batch.records.iter().map(RecordSummary::from).collect();
    let value = serde_json::to_value(&summaries).unwrap();

    assert_eq!(value[0]["url"], "https://www.example.com/search?q=burp+suite&page=2");
    assert_eq!(value[0]["length"], 13);
    assert_eq!(value[1]["ajax"], true);
    assert_eq!(value[1]["capture_time"], "12:05:00");
}

#[test]
fn test_non_array_is_rejected() {
    let err = normalize_json(r#"{"request": {}}"#).unwrap_err();
    assert!(matches!(err, LogError::NotAnArray("an object")));

    let err = normalize_json("[").unwrap_err();
    assert!(matches!(err, LogError::Json(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = normalize_file(Path::new("/nonexistent/proxy.json")).unwrap_err();
    assert!(matches!(err, LogError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/proxy.json"));
}

#[test]
fn test_normalize_from_temp_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"request": {{"method": "TRACE", "path": "/"}}, "response": {{"status": 405}}}}]"#
    )
    .unwrap();

    let batch = normalize_file(file.path()).unwrap();
    assert!(batch.is_complete());
    assert!(batch.records[0].is_trace());
    assert_eq!(batch.records[0].status(), 405);
}

struct LoopbackClient;

impl ReplayClient for LoopbackClient {
    type Error = std::convert::Infallible;

    fn execute(&self, spec: &ReplaySpec) -> Result<TransactionRecord, Self::Error> {
        let mut headers = spec.headers.clone();
        headers.insert("X-Replayed", "1");
        let entry = serde_json::json!([{
            "request": {
                "method": spec.method,
                "path": spec.url,
                "body": String::from_utf8_lossy(&spec.body),
                "headers": headers,
            },
            "response": {"status": 200, "reason": "OK"}
        }]);
        let batch = burplog::normalize_value(entry).unwrap();
        Ok(batch.records.into_iter().next().unwrap())
    }
}

#[test]
fn test_replay_fixture_request() {
    let mut batch = normalize_file(&fixture("proxy_log.json")).unwrap();
    let record = &mut batch.records[1];

    let result = replay(
        &LoopbackClient,
        record,
        ReplayOverrides::new().with_body("username=admin&password=x"),
    )
    .unwrap();

    assert_eq!(result.request_header("Content-Length"), Some("25"));
    assert_eq!(result.request_header("X-Replayed"), Some("1"));
    assert_eq!(result.path(), Some("http://www.example.com/login"));
    assert_eq!(record.replayed().len(), 1);
    assert_eq!(record.request_header("Content-Length"), Some("30"));
}
