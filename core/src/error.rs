//! Error types for the AppGrid client.
//!
//! # Design
//! `Http` carries the method alongside the status because the session manager
//! only treats a 401 on a GET as an expired session; POST failures always
//! reach the caller untouched. `Service` is reserved for error envelopes the
//! service returns inside an otherwise successful response.

use thiserror::Error;

use crate::http::HttpMethod;

pub type Result<T> = std::result::Result<T, AppGridError>;

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum AppGridError {
    /// The client options cannot produce a usable client.
    #[error("invalid client configuration: {0}")]
    Configuration(String),

    /// The service answered with a failure status.
    #[error("AppGrid {method} request failed. Status Code: {status}. {message}")]
    Http {
        method: HttpMethod,
        status: u16,
        status_text: String,
        /// Envelope message when the body carried one, status text otherwise.
        message: String,
        body: String,
    },

    /// A successful response carried an `error` envelope.
    #[error("AppGrid request error. Code: {code} Message: {message}. Status: {status}")]
    Service {
        code: String,
        message: String,
        status: String,
    },

    /// A caller-supplied argument was rejected before any request was sent.
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request never produced a response (connection, TLS, timeout).
    #[error("transport failure: {0}")]
    Transport(String),
}

impl AppGridError {
    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppGridError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for the one failure that triggers session recreation: a GET
    /// answered with 401.
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            AppGridError::Http {
                method: HttpMethod::Get,
                status: 401,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(method: HttpMethod, status: u16) -> AppGridError {
        AppGridError::Http {
            method,
            status,
            status_text: "Unauthorized".to_string(),
            message: "Unauthorized".to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn get_401_is_session_expiry() {
        assert!(http(HttpMethod::Get, 401).is_session_expired());
    }

    #[test]
    fn post_401_is_not_session_expiry() {
        assert!(!http(HttpMethod::Post, 401).is_session_expired());
    }

    #[test]
    fn other_statuses_are_not_session_expiry() {
        assert!(!http(HttpMethod::Get, 403).is_session_expired());
        assert!(!http(HttpMethod::Get, 500).is_session_expired());
        assert!(!AppGridError::Transport("reset".to_string()).is_session_expired());
    }

    #[test]
    fn status_is_exposed_for_http_errors_only() {
        assert_eq!(http(HttpMethod::Get, 404).status(), Some(404));
        assert_eq!(AppGridError::Validation("x".to_string()).status(), None);
    }

    #[test]
    fn post_failure_message_names_status() {
        let err = http(HttpMethod::Post, 500);
        assert_eq!(
            err.to_string(),
            "AppGrid POST request failed. Status Code: 500. Unauthorized"
        );
    }
}
