//! Session lifecycle for one client.
//!
//! # Design
//! The session key lives in the client's `ClientConfig` behind a mutex that is
//! only held to copy or replace fields, never across an await. Operations
//! passed to `with_session_handling` rebuild their request from a fresh
//! config snapshot each time they run, so a retry after recreation always
//! carries the new key.
//!
//! Two calls issued concurrently while no session exists each create one.
//! The last creation to resolve wins and the change hook fires once per
//! creation.

use std::future::Future;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::{ClientConfig, Hooks};
use crate::error::{AppGridError, Result};
use crate::request::{self, Query};
use crate::transport::{self, Transport};

const SESSION_PATH: &str = "/session";

#[derive(Debug)]
pub struct SessionManager {
    config: Mutex<ClientConfig>,
    hooks: Hooks,
}

impl SessionManager {
    pub fn new(config: ClientConfig, hooks: Hooks) -> Self {
        Self {
            config: Mutex::new(config),
            hooks,
        }
    }

    /// Copy of the current configuration.
    pub fn config(&self) -> ClientConfig {
        self.config.lock().clone()
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn session_key(&self) -> Option<String> {
        self.config.lock().session_key.clone()
    }

    /// Store a new session key and notify the change hook.
    pub fn set_session_key(&self, key: impl Into<String>) {
        let key = key.into();
        self.config.lock().session_key = Some(key.clone());
        self.hooks.session_key_changed(&key);
    }

    /// Forget the current session key. Does not notify.
    pub fn clear_session_key(&self) {
        self.config.lock().session_key = None;
    }

    /// Create a session and store its key.
    ///
    /// Any existing key is dropped first so the bootstrap request does not
    /// carry a stale `X-SESSION` header. Failures propagate as-is; creation is
    /// never retried.
    pub async fn create_session<T: Transport + ?Sized>(&self, transport: &T) -> Result<String> {
        self.clear_session_key();
        let req = request::build_get(&self.config(), SESSION_PATH, &Query::new());
        let json = transport::grab(transport, &self.hooks, req).await?;
        let key = json
            .get("sessionKey")
            .and_then(|v| v.as_str())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppGridError::Deserialization(format!("session response has no sessionKey: {json}"))
            })?
            .to_string();
        info!("created AppGrid session");
        self.set_session_key(key.clone());
        Ok(key)
    }

    /// Run `operation` with a valid session.
    ///
    /// Without a key, a session is created first. With a key, an expired
    /// session (GET 401) is recreated and `operation` retried exactly once;
    /// whatever the retry returns is final. Other failures are returned
    /// unchanged.
    pub async fn with_session_handling<T, R, F, Fut>(
        &self,
        transport: &T,
        operation: F,
    ) -> Result<R>
    where
        T: Transport + ?Sized,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        if self.session_key().is_none() {
            self.create_session(transport).await?;
            return operation().await;
        }

        match operation().await {
            Err(err) if err.is_session_expired() => {
                warn!("AppGrid session expired, recreating");
                self.hooks.log("Session expired, creating a new one");
                self.clear_session_key();
                self.create_session(transport).await?;
                operation().await
            }
            other => other,
        }
    }
}
