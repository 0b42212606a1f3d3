//! Request builder: URL, query string and headers from a `ClientConfig`.
//!
//! Pure functions. Given the same config and query they produce the same
//! `HttpRequest`, byte for byte.

use crate::config::ClientConfig;
use crate::error::{AppGridError, Result};
use crate::http::{HttpMethod, HttpRequest};

const MIME_TYPE_JSON: &str = "application/json";

/// Value of one query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    One(String),
    /// Serialized as comma-joined items.
    Many(Vec<String>),
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.into(), QueryValue::One(value.into())));
        self
    }

    /// Append a list parameter. Empty lists are dropped.
    pub fn push_list<I, S>(&mut self, key: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.pairs.push((key.into(), QueryValue::Many(values)));
        }
        self
    }

    /// Replace the value of `key` where it already sits, or append it.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = QueryValue::One(value.into());
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.pairs.push((key.to_string(), value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encode into `k=v&k=a,b`. List separators stay literal.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    QueryValue::One(v) => urlencoding::encode(v).into_owned(),
                    QueryValue::Many(items) => items
                        .iter()
                        .map(|item| urlencoding::encode(item))
                        .collect::<Vec<_>>()
                        .join(","),
                };
                format!("{}={value}", urlencoding::encode(key))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Percent-encode one caller-supplied path segment.
pub fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Caller parameters followed by the client identifiers. The identifiers
/// win when a caller used the same key.
pub fn query_string(config: &ClientConfig, extra: &Query) -> String {
    let mut query = extra.clone();
    query.set("appKey", config.app_key.as_str());
    query.set("uuid", config.device_id.as_str());
    if let Some(gid) = &config.gid {
        query.set("gid", gid.as_str());
    }
    query.encode()
}

pub fn request_url(config: &ClientConfig, path: &str, extra: &Query) -> String {
    format!("{}{path}?{}", config.host, query_string(config, extra))
}

pub fn headers(config: &ClientConfig, method: HttpMethod) -> Vec<(String, String)> {
    let mut headers = vec![("Accept".to_string(), MIME_TYPE_JSON.to_string())];
    if method == HttpMethod::Post {
        headers.push(("Content-Type".to_string(), MIME_TYPE_JSON.to_string()));
    }
    if let Some(ip) = &config.client_ip {
        headers.push(("X-FORWARDED-FOR".to_string(), ip.clone()));
    }
    if let Some(key) = &config.session_key {
        headers.push(("X-SESSION".to_string(), key.clone()));
    }
    if config.no_cache {
        headers.push(("X-NO-CACHE".to_string(), "true".to_string()));
    }
    headers
}

pub fn build_get(config: &ClientConfig, path: &str, extra: &Query) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: request_url(config, path, extra),
        headers: headers(config, HttpMethod::Get),
        body: None,
    }
}

pub fn build_post(
    config: &ClientConfig,
    path: &str,
    extra: &Query,
    body: &serde_json::Value,
) -> Result<HttpRequest> {
    let body =
        serde_json::to_string(body).map_err(|e| AppGridError::Serialization(e.to_string()))?;
    Ok(HttpRequest {
        method: HttpMethod::Post,
        url: request_url(config, path, extra),
        headers: headers(config, HttpMethod::Post),
        body: Some(body),
    })
}
