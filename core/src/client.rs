//! The AppGrid client: one validated configuration, one session manager and
//! one transport.
//!
//! # Design
//! Resource methods live in `crate::api`, one module per resource, each adding
//! an `impl` block to `AppGridClient`. They all funnel through the three
//! request helpers below, which decide whether session handling applies.

use bytes::Bytes;
use serde_json::Value;

use crate::config::{ClientConfig, ClientOptions};
use crate::error::Result;
use crate::request::{self, Query};
use crate::session::SessionManager;
use crate::transport::{self, ReqwestTransport, Transport};
use crate::types::Ack;

/// Client for the AppGrid REST API.
///
/// Owns its configuration; the session key inside it is created and
/// replaced as needed. Share one instance behind an `Arc` rather than cloning
/// configuration between clients.
#[derive(Debug)]
pub struct AppGridClient<T: Transport = ReqwestTransport> {
    session: SessionManager,
    transport: T,
}

impl AppGridClient<ReqwestTransport> {
    /// Validate `options` and build a client over HTTP.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let transport = ReqwestTransport::new(options.request_timeout())?;
        Self::with_transport(options, transport)
    }
}

impl<T: Transport> AppGridClient<T> {
    /// Validate `options` and build a client over a custom transport.
    pub fn with_transport(options: ClientOptions, transport: T) -> Result<Self> {
        let (config, hooks) = options.validate()?;
        tracing::debug!(device_id = %config.device_id, host = %config.host, "AppGrid client ready");
        Ok(Self {
            session: SessionManager::new(config, hooks),
            transport,
        })
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> ClientConfig {
        self.session.config()
    }

    pub fn device_id(&self) -> String {
        self.session.config().device_id
    }

    /// The session key currently in use, if any.
    pub fn session_key(&self) -> Option<String> {
        self.session.session_key()
    }

    /// Create a new session, replacing the current one.
    pub async fn create_session(&self) -> Result<String> {
        self.session.create_session(&self.transport).await
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Authenticated GET returning JSON.
    pub(crate) async fn get_json(&self, path: &str, query: &Query) -> Result<Value> {
        let (session, transport) = (&self.session, &self.transport);
        session
            .with_session_handling(transport, move || async move {
                let req = request::build_get(&session.config(), path, query);
                transport::grab(transport, session.hooks(), req).await
            })
            .await
    }

    /// Authenticated POST of a JSON body.
    pub(crate) async fn post_json(&self, path: &str, body: &Value) -> Result<Ack> {
        let (session, transport) = (&self.session, &self.transport);
        session
            .with_session_handling(transport, move || async move {
                let req = request::build_post(&session.config(), path, &Query::new(), body)?;
                transport::post(transport, session.hooks(), req).await
            })
            .await
    }

    /// GET of an unauthenticated binary resource. No session is created.
    pub(crate) async fn get_raw(&self, path: &str) -> Result<Bytes> {
        let req = request::build_get(&self.session.config(), path, &Query::new());
        transport::grab_raw(&self.transport, self.session.hooks(), req).await
    }
}
