//! Async client SDK for the AppGrid REST API.
//!
//! # Overview
//! Wraps content entries, assets, usage events, application logs, plugins,
//! profile, metadata and user data behind one [`AppGridClient`]. Sessions are
//! handled transparently: the first authenticated call creates one, and a
//! GET answered with 401 recreates it and retries the call once.
//!
//! # Design
//! - `request` builds `HttpRequest` values as plain data; `transport` executes
//!   them through the [`Transport`] trait and classifies the responses.
//! - `session` owns the session key and the retry-on-expiry wrapper.
//! - `api` holds one module per resource, each extending `AppGridClient`.
//! - Callers observe device id generation and session key rotation through
//!   the hooks on [`ClientOptions`], e.g. to persist them in cookies.
//!
//! ```no_run
//! # async fn demo() -> appgrid_core::Result<()> {
//! use appgrid_core::{AppGridClient, ClientOptions, EntryParams};
//!
//! let client = AppGridClient::new(ClientOptions::new("MY_APP_KEY").device_id("DEVICE_ID"))?;
//! let entries = client.get_entries(&EntryParams::new().ids(["a", "b"])).await?;
//! # let _ = entries;
//! # Ok(())
//! # }
//! ```

mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod request;
pub mod session;
pub mod transport;
pub mod types;

pub use client::AppGridClient;
pub use config::{generate_device_id, ClientConfig, ClientOptions, Hooks, DEFAULT_HOST};
pub use error::{AppGridError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{At, EntryParams};
pub use request::{Query, QueryValue};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    time_of_day_bucket, time_of_day_dim_value, Ack, Dimensions, LogDetails, LogEvent, LogLevel,
    UsageEvent, UsageEventType, UserDataScope,
};
