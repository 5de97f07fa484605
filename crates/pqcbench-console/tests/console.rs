use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use pqcbench_console::Console;
use pqcbench_core::{ConsoleConfig, PqcBenchError};
use serde_json::json;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    content_type: Option<String>,
    body: Vec<u8>,
}

#[derive(Clone, Default)]
struct MockBackend {
    routes: Arc<Mutex<HashMap<String, (StatusCode, String)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    fn respond(&self, path: &str, status: StatusCode, body: impl Into<String>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    async fn spawn(&self) -> String {
        let app = Router::new().fallback(record).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

async fn record(State(mock): State<MockBackend>, req: Request) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(req.into_body(), usize::MAX).await.unwrap().to_vec();

    mock.requests.lock().unwrap().push(Recorded {
        method,
        path: path.clone(),
        content_type,
        body,
    });

    let route = mock.routes.lock().unwrap().get(&path).cloned();
    match route {
        Some((status, body)) => (status, Body::from(body)).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

async fn console_for(mock: &MockBackend) -> Console {
    let mut config = ConsoleConfig::default();
    config.backend.base_url = mock.spawn().await;
    config.backend.timeout_secs = 5;
    config.session.user = Some("alice".to_string());
    Console::new(&config).unwrap()
}

#[tokio::test]
async fn test_invalid_json_makes_no_request() {
    let mock = MockBackend::default();
    let console = console_for(&mock).await;

    for raw in ["{amount: 1}", "12 apples", "", "{\"a\":"] {
        assert!(console.push_single(raw).await.is_err());
        assert_eq!(console.single_status(), "❌ Invalid JSON format.");
    }
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_valid_json_posts_once_with_reserialized_body() {
    let mock = MockBackend::default();
    mock.respond("/encrypt-transaction/", StatusCode::OK, "{}");
    let console = console_for(&mock).await;

    let raw = r#"{ "amount" : 125.5, "card": {"last4": "4242"}, "tags": [1, 2] }"#;
    console.push_single(raw).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/encrypt-transaction/");
    assert_eq!(req.content_type.as_deref(), Some("application/json"));

    let sent: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(raw).unwrap();
    assert_eq!(sent, parsed);
    assert_eq!(
        String::from_utf8(req.body.clone()).unwrap(),
        r#"{"amount":125.5,"card":{"last4":"4242"},"tags":[1,2]}"#
    );

    assert_eq!(console.single_status(), "✅ 1 transaction pushed successfully!");
}

#[tokio::test]
async fn test_push_keeps_typed_key_order() {
    let mock = MockBackend::default();
    mock.respond("/encrypt-transaction/", StatusCode::OK, "{}");
    let console = console_for(&mock).await;

    console
        .push_single(r#"{"to": "bob", "amount": 1, "currency": "EUR", "meta": {"z": 1, "a": 2}}"#)
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        String::from_utf8(requests[0].body.clone()).unwrap(),
        r#"{"to":"bob","amount":1,"currency":"EUR","meta":{"z":1,"a":2}}"#
    );
}

#[tokio::test]
async fn test_rejected_push_shows_body() {
    let mock = MockBackend::default();
    mock.respond(
        "/encrypt-transaction/",
        StatusCode::UNPROCESSABLE_ENTITY,
        "Request validation failed.",
    );
    let console = console_for(&mock).await;

    let err = console.push_single(r#"{"amount": -1}"#).await.unwrap_err();
    assert!(matches!(err, PqcBenchError::Rejected { status: 422, .. }));
    assert_eq!(console.single_status(), "❌ Push failed: Request validation failed.");
}

#[tokio::test]
async fn test_transport_failure_still_updates_status() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = ConsoleConfig::default();
    config.backend.base_url = format!("http://{}", addr);
    let console = Console::new(&config).unwrap();

    assert!(console.push_single("{}").await.is_err());
    assert!(console.single_status().starts_with("❌ Push failed: HTTP error"));
}

#[tokio::test]
async fn test_no_file_makes_no_request() {
    let mock = MockBackend::default();
    let console = console_for(&mock).await;

    assert!(console.push_bulk(None).await.is_err());
    assert_eq!(console.bulk_status(), "Please select a file.");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_bulk_upload_reports_total_records() {
    let mock = MockBackend::default();
    mock.respond("/pushBulk", StatusCode::OK, json!({"total_records": 42}).to_string());
    let console = console_for(&mock).await;

    let mut file = tempfile::Builder::new().suffix(".CSV").tempfile().unwrap();
    writeln!(file, "id,amount").unwrap();
    writeln!(file, "1,10.00").unwrap();

    let receipt = console.push_bulk(Some(file.path())).await.unwrap();
    assert_eq!(receipt.total_records, 42);
    assert!(console.bulk_status().contains("42"));

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/pushBulk");
    let content_type = requests[0].content_type.clone().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&requests[0].body).to_lowercase();
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("content-type: text/csv"));
    assert!(body.contains("1,10.00"));

    let log = console.bulk_log();
    assert!(log[0].contains("csv"));
    assert_eq!(log.last().unwrap(), "Processed 42 records");
}

#[tokio::test]
async fn test_bulk_rejection_shows_body_and_resets_log() {
    let mock = MockBackend::default();
    mock.respond("/pushBulk", StatusCode::BAD_REQUEST, "Unsupported file type");
    let console = console_for(&mock).await;

    let file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
    assert!(console.push_bulk(Some(file.path())).await.is_err());
    assert_eq!(console.bulk_status(), "❌ Bulk load failed: Unsupported file type");
    let first_log = console.bulk_log();

    assert!(console.push_bulk(None).await.is_err());
    assert!(!first_log.is_empty());
    assert!(console.bulk_log().is_empty());
}

#[tokio::test]
async fn test_submitters_keep_separate_status() {
    let mock = MockBackend::default();
    mock.respond("/encrypt-transaction/", StatusCode::OK, "{}");
    mock.respond("/pushBulk", StatusCode::OK, json!({"total_records": 7}).to_string());
    let console = console_for(&mock).await;

    let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    let (single, bulk) = tokio::join!(
        console.push_single(r#"{"amount": 1}"#),
        console.push_bulk(Some(file.path()))
    );
    assert!(single.is_ok());
    assert!(bulk.is_ok());
    assert_eq!(console.single_status(), "✅ 1 transaction pushed successfully!");
    assert_eq!(console.bulk_status(), "✅ Bulk load complete. Processed: 7.");
}

fn session_row(id: i64, latency: f64) -> serde_json::Value {
    json!({
        "id": id, "type": "session", "latency": latency, "stddev": 0.333333,
        "min_latency": 1, "max_latency": 9.999, "throughput": 1234.5678,
        "error_rate": 0.0, "encryption_time": 2.71828, "algorithm": "PQC",
        "timestamp": "2025-03-02 10:15:00"
    })
}

#[tokio::test]
async fn test_session_table_has_header_plus_one_row_per_record() {
    let mock = MockBackend::default();
    let rows: Vec<_> = (1..=4).map(|i| session_row(i, 3.14159)).collect();
    mock.respond("/benchmarks/sessions", StatusCode::OK, json!(rows).to_string());
    let console = console_for(&mock).await;

    let table = console.fetch_session_benchmarks().await.unwrap();
    assert_eq!(table.row_count(), 5);
    assert_eq!(table.to_html().lines().count(), 5);

    let first = &table.rows()[0];
    assert_eq!(first[0], "1");
    assert_eq!(first[2], "3.14");
    assert_eq!(first[4], "1.00");
    assert_eq!(first[5], "10.00");
    assert_eq!(first[6], "1234.57");
    assert_eq!(first[9], "2025-03-02 10:15:00");
    for cell in &first[2..9] {
        assert_eq!(cell.split('.').nth(1).map(str::len), Some(2));
    }
    assert_eq!(console.session_table(), Some(table));
}

#[tokio::test]
async fn test_table_is_rebuilt_not_merged() {
    let mock = MockBackend::default();
    mock.respond(
        "/benchmarks/sessions",
        StatusCode::OK,
        json!([session_row(1, 1.0), session_row(2, 2.0)]).to_string(),
    );
    let console = console_for(&mock).await;
    assert_eq!(console.fetch_session_benchmarks().await.unwrap().row_count(), 3);

    mock.respond("/benchmarks/sessions", StatusCode::OK, json!([session_row(3, 3.0)]).to_string());
    let table = console.fetch_session_benchmarks().await.unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows()[0][0], "3");
}

#[tokio::test]
async fn test_live_table_one_row_per_key_in_order() {
    let mock = MockBackend::default();
    let metrics = json!({
        "average_latency": 0.125, "stddev_latency": 0.0, "min_latency": 0.1,
        "max_latency": 0.2, "throughput": 50.0, "error_rate": 0.0
    });
    let body = format!(r#"{{"RSA":{m},"AES":{m},"PQC":{m}}}"#, m = metrics);
    mock.respond("/benchmarks/live", StatusCode::OK, body);
    let console = console_for(&mock).await;

    let table = console.fetch_live_benchmarks().await.unwrap();
    let algorithms: Vec<&str> = table.rows().iter().map(|r| r[0].as_str()).collect();
    assert_eq!(algorithms, vec!["RSA", "AES", "PQC"]);
    assert_eq!(table.header().len(), 7);
    assert_eq!(table.rows()[0][1], "0.13");
}

#[tokio::test]
async fn test_malformed_benchmarks_keep_previous_table() {
    let mock = MockBackend::default();
    mock.respond("/benchmarks/live", StatusCode::OK, json!({}).to_string());
    let console = console_for(&mock).await;
    let empty = console.fetch_live_benchmarks().await.unwrap();
    assert_eq!(empty.row_count(), 1);

    mock.respond("/benchmarks/live", StatusCode::OK, r#"{"RSA": {"average_latency": "fast"}}"#);
    assert!(matches!(
        console.fetch_live_benchmarks().await,
        Err(PqcBenchError::Decode(_))
    ));
    assert_eq!(console.live_table(), Some(empty));
}

#[tokio::test]
async fn test_history_table() {
    let mock = MockBackend::default();
    mock.respond(
        "/benchmarks/history",
        StatusCode::OK,
        json!([{
            "algorithm": "PQC", "avg_latency": 2.0, "avg_stddev": 0.5,
            "avg_min_latency": 1.0, "avg_max_latency": 4.0, "avg_throughput": 800.0,
            "avg_error_rate": 0.0, "avg_encryption_time": 1.5
        }])
        .to_string(),
    );
    let console = console_for(&mock).await;

    let table = console.fetch_history_benchmarks().await.unwrap();
    assert_eq!(table.header().len(), 8);
    assert_eq!(table.rows()[0], vec!["PQC", "2.00", "0.50", "1.00", "4.00", "800.00", "0.00", "1.50"]);
}

#[tokio::test]
async fn test_logout_expires_cookie_and_navigates() {
    let mock = MockBackend::default();
    mock.respond("/logout", StatusCode::OK, "bye");
    let console = console_for(&mock).await;
    assert_eq!(console.session_cookie().as_deref(), Some("alice"));

    let status = console.logout().await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(console.session_cookie(), None);
    assert_eq!(console.navigations(), vec!["/logout"]);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/logout");
}
