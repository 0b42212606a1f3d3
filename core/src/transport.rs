//! Transport: executes `HttpRequest` values and classifies the responses.
//!
//! # Design
//! `Transport` is the single I/O seam. `ReqwestTransport` is the production
//! implementation; tests plug in scripted transports. The `grab`, `grab_raw`
//! and `post` functions hold the response rules and are shared by every
//! transport, so status handling never depends on which one is in use.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::Hooks;
use crate::error::{AppGridError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Ack;

/// Executes one HTTP round-trip.
///
/// Implementations return any status the server produced as data; only
/// failures that yield no response at all become `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// `reqwest`-backed transport with a cookie store, so cookies set by the
/// service are sent back on later requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AppGridError::Transport(e.to_string()))?;
        Ok(Self { http })
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut rb = match request.method {
            HttpMethod::Get => self.http.get(&request.url),
            HttpMethod::Post => self.http.post(&request.url),
        };
        for (name, value) in &request.headers {
            rb = rb.header(name, value);
        }
        if let Some(body) = request.body {
            rb = rb.body(body);
        }

        let resp = rb.send().await.map_err(from_reqwest)?;
        let status = resp.status();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = resp.bytes().await.map_err(from_reqwest)?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn from_reqwest(e: reqwest::Error) -> AppGridError {
    if e.is_timeout() {
        AppGridError::Transport(format!("request timed out: {e}"))
    } else {
        AppGridError::Transport(e.to_string())
    }
}

/// GET and parse the JSON body.
pub async fn grab<T: Transport + ?Sized>(
    transport: &T,
    hooks: &Hooks,
    request: HttpRequest,
) -> Result<Value> {
    let response = fetch(transport, hooks, request).await?;
    let json = parse_json(&response)?;
    hooks.log(&format!("GET response {json}"));
    Ok(json)
}

/// GET and return the body untouched.
pub async fn grab_raw<T: Transport + ?Sized>(
    transport: &T,
    hooks: &Hooks,
    request: HttpRequest,
) -> Result<Bytes> {
    let response = fetch(transport, hooks, request).await?;
    hooks.log(&format!(
        "GET response: {} bytes ({})",
        response.body.len(),
        response.header("content-type").unwrap_or("unknown type")
    ));
    Ok(response.body)
}

/// POST and acknowledge. The response body is not read.
pub async fn post<T: Transport + ?Sized>(
    transport: &T,
    hooks: &Hooks,
    request: HttpRequest,
) -> Result<Ack> {
    debug!(url = %request.url, "sending AppGrid POST");
    hooks.log(&format!(
        "Sending a POST request to: {}. With the following headers and body: {:?} {}",
        request.url,
        request.headers,
        request.body.as_deref().unwrap_or_default()
    ));
    let response = transport.send(request).await?;
    let ack = parse_ack(&response)?;
    debug!(status = ack.status, "AppGrid POST acknowledged");
    hooks.log(&format!("POST response: {} {}", ack.status, ack.status_text));
    Ok(ack)
}

async fn fetch<T: Transport + ?Sized>(
    transport: &T,
    hooks: &Hooks,
    request: HttpRequest,
) -> Result<HttpResponse> {
    debug!(url = %request.url, "sending AppGrid GET");
    hooks.log(&format!(
        "Sending a GET request to: {} with the following headers {:?}",
        request.url, request.headers
    ));
    let response = transport.send(request).await?;
    if let Err(err) = check_get_status(&response) {
        debug!(status = response.status, "AppGrid GET failed");
        hooks.log(&format!("GET failed with status {}", response.status));
        return Err(err);
    }
    Ok(response)
}

/// Any status of 400 or above fails a GET.
pub fn check_get_status(response: &HttpResponse) -> Result<()> {
    if response.status < 400 {
        return Ok(());
    }
    let body = response.text();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| error_envelope(&json))
        .map(|(code, message, status)| {
            format!("Code: {code} Message: {message}. Status: {status}")
        })
        .unwrap_or_else(|| response.status_text.clone());
    Err(AppGridError::Http {
        method: HttpMethod::Get,
        status: response.status,
        status_text: response.status_text.clone(),
        message,
        body,
    })
}

/// Parse a successful GET body, surfacing an embedded error envelope.
pub fn parse_json(response: &HttpResponse) -> Result<Value> {
    let json: Value = serde_json::from_slice(&response.body)
        .map_err(|e| AppGridError::Deserialization(e.to_string()))?;
    if let Some((code, message, status)) = error_envelope(&json) {
        return Err(AppGridError::Service {
            code,
            message,
            status,
        });
    }
    Ok(json)
}

/// Only an exact 200 acknowledges a POST.
pub fn parse_ack(response: &HttpResponse) -> Result<Ack> {
    if response.status != 200 {
        return Err(AppGridError::Http {
            method: HttpMethod::Post,
            status: response.status,
            status_text: response.status_text.clone(),
            message: format!("Status Text: {}", response.status_text),
            body: response.text(),
        });
    }
    Ok(Ack {
        status: response.status,
        status_text: response.status_text.clone(),
    })
}

/// `{ "error": { code, message, status } }` as display strings.
fn error_envelope(json: &Value) -> Option<(String, String, String)> {
    let error = json.get("error")?.as_object()?;
    let field = |name: &str| match error.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    Some((field("code"), field("message"), field("status")))
}
