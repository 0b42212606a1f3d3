//! Session handling observed through a scripted transport.
//!
//! # Design
//! `Scripted` answers requests from a queue and records every request it
//! saw, so each test can assert exactly which calls went out and in what
//! order, without a server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use appgrid_core::{
    AppGridClient, AppGridError, ClientOptions, EntryParams, HttpMethod, HttpRequest,
    HttpResponse, LogDetails, Result, Transport,
};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Default)]
struct Scripted {
    responses: Mutex<VecDeque<(u16, &'static str, &'static str)>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl Scripted {
    fn new(responses: &[(u16, &'static str, &'static str)]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().copied().collect()),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// Path of each request, without host or query string.
    fn paths(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|r| {
                let without_host = r.url.trim_start_matches("http://appgrid.test");
                without_host.split('?').next().unwrap().to_string()
            })
            .collect()
    }
}

#[async_trait]
impl Transport for Scripted {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.sent.lock().unwrap().push(request);
        // Suspend like real I/O so concurrent callers interleave.
        tokio::task::yield_now().await;
        let next = self.responses.lock().unwrap().pop_front();
        let (status, status_text, body) = next.expect("no scripted response left");
        Ok(HttpResponse {
            status,
            status_text: status_text.to_string(),
            headers: Vec::new(),
            body: Bytes::from_static(body.as_bytes()),
        })
    }
}

const SESSION_A: (u16, &str, &str) = (200, "OK", r#"{"sessionKey":"session-a"}"#);
const SESSION_B: (u16, &str, &str) = (200, "OK", r#"{"sessionKey":"session-b"}"#);
const UNAUTHORIZED: (u16, &str, &str) = (401, "Unauthorized", "");
const PLUGINS: (u16, &str, &str) = (200, "OK", r#"[{"name":"analytics"}]"#);

fn options() -> ClientOptions {
    ClientOptions::new("app")
        .device_id("device")
        .host("http://appgrid.test")
}

fn client(
    options: ClientOptions,
    script: &[(u16, &'static str, &'static str)],
) -> AppGridClient<Scripted> {
    AppGridClient::with_transport(options, Scripted::new(script)).unwrap()
}

#[tokio::test]
async fn first_call_creates_exactly_one_session_first() {
    let client = client(options(), &[SESSION_A, PLUGINS]);

    let plugins = client.get_all_enabled_plugins().await.unwrap();

    assert_eq!(plugins[0]["name"], "analytics");
    assert_eq!(client.transport().paths(), vec!["/session", "/plugins"]);
    let sent = client.transport().sent();
    assert_eq!(sent[1].header("X-SESSION"), Some("session-a"));
    assert_eq!(client.session_key().as_deref(), Some("session-a"));
}

#[tokio::test]
async fn existing_session_is_reused() {
    let client = client(options().session_key("known"), &[PLUGINS, PLUGINS]);

    client.get_all_enabled_plugins().await.unwrap();
    client.get_all_enabled_plugins().await.unwrap();

    assert_eq!(client.transport().paths(), vec!["/plugins", "/plugins"]);
    assert!(client
        .transport()
        .sent()
        .iter()
        .all(|r| r.header("X-SESSION") == Some("known")));
}

#[tokio::test]
async fn get_401_recreates_session_and_retries_once() {
    let changes = Arc::new(AtomicUsize::new(0));
    let counter = changes.clone();
    let options = options()
        .session_key("expired")
        .on_session_key_changed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    let client = client(options, &[UNAUTHORIZED, SESSION_B, PLUGINS]);

    client.get_all_enabled_plugins().await.unwrap();

    assert_eq!(client.transport().paths(), vec!["/plugins", "/session", "/plugins"]);
    let sent = client.transport().sent();
    assert_eq!(sent[0].header("X-SESSION"), Some("expired"));
    assert_eq!(sent[1].header("X-SESSION"), None);
    assert_eq!(sent[2].header("X-SESSION"), Some("session-b"));
    assert_eq!(changes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_401_after_retry_is_returned_unchanged() {
    let client = client(
        options().session_key("expired"),
        &[UNAUTHORIZED, SESSION_B, UNAUTHORIZED],
    );

    let err = client.get_all_enabled_plugins().await.unwrap_err();

    assert!(matches!(err, AppGridError::Http { status: 401, .. }));
    assert_eq!(client.transport().paths(), vec!["/plugins", "/session", "/plugins"]);
}

#[tokio::test]
async fn other_failure_after_retry_is_returned_unchanged() {
    let client = client(
        options().session_key("expired"),
        &[UNAUTHORIZED, SESSION_B, (503, "Service Unavailable", "")],
    );

    let err = client.get_application_status().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn non_401_failure_is_not_retried() {
    let client = client(
        options().session_key("known"),
        &[(404, "Not Found", r#"{"error":{"code":"404","message":"gone","status":404}}"#)],
    );

    let err = client
        .get_entry_by_id("missing", &EntryParams::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("gone"));
    assert_eq!(client.transport().paths(), vec!["/content/entry/missing"]);
}

#[tokio::test]
async fn failed_session_creation_is_fatal_for_the_call() {
    let client = client(options(), &[(500, "Internal Server Error", "")]);

    let err = client.get_profile_info().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(client.transport().paths(), vec!["/session"]);
    assert!(client.session_key().is_none());
}

#[tokio::test]
async fn post_401_is_not_retried() {
    let client = client(options().session_key("expired"), &[UNAUTHORIZED]);

    let err = client.send_usage_start_event().await.unwrap_err();

    assert!(matches!(
        err,
        AppGridError::Http { method: HttpMethod::Post, status: 401, .. }
    ));
    assert_eq!(client.transport().paths(), vec!["/event/log"]);
}

#[tokio::test]
async fn unsupported_log_level_sends_nothing() {
    let client = client(options(), &[]);

    let err = client
        .send_log("verbose", &LogDetails::default(), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AppGridError::Validation(_)));
    assert!(client.transport().sent().is_empty());
}

#[tokio::test]
async fn raw_asset_never_creates_a_session() {
    let client = client(options(), &[(200, "OK", "binary")]);

    let bytes = client.get_asset_by_id("logo").await.unwrap();

    assert_eq!(bytes.as_ref(), b"binary");
    assert_eq!(client.transport().paths(), vec!["/asset/logo"]);
    assert_eq!(client.transport().sent()[0].header("X-SESSION"), None);
    assert!(client.session_key().is_none());
}

#[tokio::test]
async fn service_error_envelope_in_success_body() {
    let client = client(
        options().session_key("known"),
        &[(200, "OK", r#"{"error":{"code":"7","message":"nope","status":"400"}}"#)],
    );

    let err = client.get_all_metadata().await.unwrap_err();

    assert!(matches!(err, AppGridError::Service { .. }));
    assert!(!err.is_session_expired());
}

#[tokio::test]
async fn post_acknowledges_without_reading_body() {
    let client = client(options().session_key("known"), &[(200, "OK", "not json")]);

    let ack = client.send_usage_stop_event(Some(30)).await.unwrap();

    assert_eq!(ack.status, 200);
    assert_eq!(ack.status_text, "OK");
    let body: serde_json::Value =
        serde_json::from_str(client.transport().sent()[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body, serde_json::json!({"eventType": "QUIT", "retentionTime": 30}));
}

#[tokio::test]
async fn concurrent_first_calls_each_create_a_session() {
    let changes = Arc::new(AtomicUsize::new(0));
    let counter = changes.clone();
    let options = options().on_session_key_changed(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let client = client(options, &[SESSION_A, SESSION_B, PLUGINS, PLUGINS]);

    let (first, second) = tokio::join!(
        client.get_all_enabled_plugins(),
        client.get_all_enabled_plugins()
    );
    first.unwrap();
    second.unwrap();

    let sessions = client
        .transport()
        .paths()
        .iter()
        .filter(|p| *p == "/session")
        .count();
    assert_eq!(sessions, 2);
    assert_eq!(changes.load(Ordering::SeqCst), 2);
}

#[test]
fn session_key_without_device_id_fails_construction() {
    let options = ClientOptions::new("app").session_key("s");
    let err = AppGridClient::with_transport(options, Scripted::default()).unwrap_err();
    assert!(matches!(err, AppGridError::Configuration(_)));
}

#[test]
fn generated_device_id_is_reported_once() {
    let reported = Arc::new(Mutex::new(Vec::new()));
    let sink = reported.clone();
    let options = ClientOptions::new("app")
        .on_device_id_generated(move |id| sink.lock().unwrap().push(id.to_string()));

    let client = AppGridClient::with_transport(options, Scripted::default()).unwrap();

    assert_eq!(*reported.lock().unwrap(), vec![client.device_id()]);
}
