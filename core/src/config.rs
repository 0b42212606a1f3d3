//! Client configuration: caller-facing options, the validated per-client
//! state, and the observer hooks.
//!
//! # Design
//! `ClientOptions` is what callers build or deserialize. `validate` turns it
//! into a `ClientConfig` (plain data, owned by one client) and a `Hooks`
//! value whose callbacks are resolved to no-ops once, here, so nothing
//! downstream has to branch on a missing callback.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppGridError, Result};

pub const DEFAULT_HOST: &str = "https://appgrid-api.cloud.accedo.tv";

/// Callback receiving SDK log lines.
pub type Logger = Arc<dyn Fn(&str) + Send + Sync>;

/// Callback receiving a newly generated device id or a new session key.
pub type IdentifierCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Generate a random device identifier (UUID v4).
pub fn generate_device_id() -> String {
    Uuid::new_v4().to_string()
}

/// Options for building an AppGrid client.
///
/// Only `app_key` is mandatory. A missing `device_id` is generated at
/// construction and reported through `on_device_id_generated`; a missing
/// `session_key` is created lazily on the first authenticated call.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientOptions {
    pub app_key: Option<String>,
    pub device_id: Option<String>,
    pub session_key: Option<String>,
    pub gid: Option<String>,
    pub client_ip: Option<String>,
    pub no_cache: bool,
    pub host: Option<String>,
    pub timeout_ms: Option<u64>,
    #[serde(skip)]
    logger: Option<Logger>,
    #[serde(skip)]
    on_device_id_generated: Option<IdentifierCallback>,
    #[serde(skip)]
    on_session_key_changed: Option<IdentifierCallback>,
}

impl ClientOptions {
    pub fn new(app_key: impl Into<String>) -> Self {
        Self {
            app_key: Some(app_key.into()),
            ..Self::default()
        }
    }

    /// Read options from `APPGRID_*` environment variables.
    ///
    /// Unset variables leave the field empty; a non-numeric
    /// `APPGRID_TIMEOUT_MS` is a configuration error.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let timeout_ms = match var("APPGRID_TIMEOUT_MS") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
                AppGridError::Configuration(format!("APPGRID_TIMEOUT_MS={raw}: {e}"))
            })?),
            None => None,
        };
        Ok(Self {
            app_key: var("APPGRID_APP_KEY"),
            device_id: var("APPGRID_DEVICE_ID"),
            session_key: var("APPGRID_SESSION_KEY"),
            gid: var("APPGRID_GID"),
            client_ip: var("APPGRID_CLIENT_IP"),
            no_cache: false,
            host: var("APPGRID_HOST"),
            timeout_ms,
            ..Self::default()
        })
    }

    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }

    pub fn gid(mut self, gid: impl Into<String>) -> Self {
        self.gid = Some(gid.into());
        self
    }

    /// Forwarded as `X-FORWARDED-FOR` on every request.
    pub fn client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn logger(mut self, logger: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    pub fn on_device_id_generated(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_device_id_generated = Some(Arc::new(f));
        self
    }

    pub fn on_session_key_changed(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_session_key_changed = Some(Arc::new(f));
        self
    }

    /// Request timeout for the default transport, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Check usability and resolve defaults.
    ///
    /// A client needs an app key, and a session key is only accepted together
    /// with the device id it was issued for. Empty strings count as absent.
    /// Generates (and reports) a device id when none was given.
    pub fn validate(self) -> Result<(ClientConfig, Hooks)> {
        let app_key = non_empty(self.app_key);
        let device_id = non_empty(self.device_id);
        let session_key = non_empty(self.session_key);

        let Some(app_key) = app_key else {
            return Err(AppGridError::Configuration(
                "an appKey is required".to_string(),
            ));
        };
        if session_key.is_some() && device_id.is_none() {
            return Err(AppGridError::Configuration(
                "a sessionKey requires the deviceId it was issued for".to_string(),
            ));
        }

        let mut hooks = Hooks::default();
        if let Some(logger) = self.logger {
            hooks.logger = logger;
        }
        if let Some(f) = self.on_device_id_generated {
            hooks.on_device_id_generated = f;
        }
        if let Some(f) = self.on_session_key_changed {
            hooks.on_session_key_changed = f;
        }

        let device_id = match device_id {
            Some(id) => id,
            None => {
                let id = generate_device_id();
                tracing::debug!(device_id = %id, "generated device id");
                (hooks.on_device_id_generated)(&id);
                id
            }
        };

        let host = non_empty(self.host).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let config = ClientConfig {
            host: host.trim_end_matches('/').to_string(),
            app_key,
            device_id,
            session_key,
            gid: non_empty(self.gid),
            client_ip: non_empty(self.client_ip),
            no_cache: self.no_cache,
        };
        Ok((config, hooks))
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("app_key", &self.app_key)
            .field("device_id", &self.device_id)
            .field("session_key", &self.session_key.as_ref().map(|_| "<redacted>"))
            .field("gid", &self.gid)
            .field("client_ip", &self.client_ip)
            .field("no_cache", &self.no_cache)
            .field("host", &self.host)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Validated state of one client. The session manager rewrites
/// `session_key`; everything else is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub app_key: String,
    pub device_id: String,
    pub session_key: Option<String>,
    pub gid: Option<String>,
    pub client_ip: Option<String>,
    pub no_cache: bool,
}

/// Observer callbacks, always populated.
#[derive(Clone)]
pub struct Hooks {
    logger: Logger,
    on_device_id_generated: IdentifierCallback,
    on_session_key_changed: IdentifierCallback,
}

impl Hooks {
    /// Forward a line to the injected logger. A panicking logger is ignored.
    pub fn log(&self, line: &str) {
        let logger = &self.logger;
        let _ = catch_unwind(AssertUnwindSafe(|| logger(line)));
    }

    pub(crate) fn session_key_changed(&self, key: &str) {
        (self.on_session_key_changed)(key);
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            logger: Arc::new(|_: &str| {}),
            on_device_id_generated: Arc::new(|_: &str| {}),
            on_session_key_changed: Arc::new(|_: &str| {}),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn app_key_alone_generates_device_id() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (config, _) = ClientOptions::new("app")
            .on_device_id_generated(move |id| sink.lock().unwrap().push(id.to_string()))
            .validate()
            .unwrap();

        assert!(Uuid::parse_str(&config.device_id).is_ok());
        assert_eq!(*seen.lock().unwrap(), vec![config.device_id.clone()]);
        assert!(config.session_key.is_none());
    }

    #[test]
    fn given_device_id_is_kept_and_not_reported() {
        let seen = Arc::new(Mutex::new(0));
        let sink = seen.clone();
        let (config, _) = ClientOptions::new("app")
            .device_id("device-1")
            .on_device_id_generated(move |_| *sink.lock().unwrap() += 1)
            .validate()
            .unwrap();

        assert_eq!(config.device_id, "device-1");
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn app_key_device_id_and_session_key_is_valid() {
        let (config, _) = ClientOptions::new("app")
            .device_id("device-1")
            .session_key("session-1")
            .validate()
            .unwrap();
        assert_eq!(config.session_key.as_deref(), Some("session-1"));
    }

    #[test]
    fn missing_app_key_is_rejected() {
        let err = ClientOptions::default()
            .device_id("device-1")
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppGridError::Configuration(_)));
    }

    #[test]
    fn session_key_without_device_id_is_rejected() {
        let err = ClientOptions::new("app")
            .session_key("session-1")
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppGridError::Configuration(_)));
    }

    #[test]
    fn session_key_without_app_key_is_rejected() {
        let err = ClientOptions::default()
            .session_key("session-1")
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppGridError::Configuration(_)));
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let err = ClientOptions::new("").validate().unwrap_err();
        assert!(matches!(err, AppGridError::Configuration(_)));

        let (config, _) = ClientOptions::new("app")
            .device_id("d")
            .session_key("")
            .gid("")
            .validate()
            .unwrap();
        assert!(config.session_key.is_none());
        assert!(config.gid.is_none());
    }

    #[test]
    fn host_defaults_and_trailing_slash_is_stripped() {
        let (config, _) = ClientOptions::new("app").validate().unwrap();
        assert_eq!(config.host, DEFAULT_HOST);

        let (config, _) = ClientOptions::new("app")
            .host("http://localhost:3000/")
            .validate()
            .unwrap();
        assert_eq!(config.host, "http://localhost:3000");
    }

    #[test]
    fn options_deserialize_from_camel_case_json() {
        let options: ClientOptions = serde_json::from_str(
            r#"{"appKey":"app","deviceId":"d","gid":"g","noCache":true,"timeoutMs":1500}"#,
        )
        .unwrap();
        assert_eq!(options.app_key.as_deref(), Some("app"));
        assert_eq!(options.request_timeout(), Some(Duration::from_millis(1500)));

        let (config, _) = options.validate().unwrap();
        assert_eq!(config.gid.as_deref(), Some("g"));
        assert!(config.no_cache);
    }

    #[test]
    fn panicking_logger_is_contained() {
        let (_, hooks) = ClientOptions::new("app")
            .logger(|_| panic!("logger blew up"))
            .validate()
            .unwrap();
        hooks.log("still fine");
    }

    #[test]
    fn options_read_from_environment() {
        // Every case that touches process env lives here; tests run in parallel.
        let vars = [
            ("APPGRID_APP_KEY", "env-app-7f3a"),
            ("APPGRID_DEVICE_ID", "env-device-7f3a"),
            ("APPGRID_SESSION_KEY", "env-session-7f3a"),
            ("APPGRID_GID", "env-group-7f3a"),
            ("APPGRID_CLIENT_IP", "192.0.2.44"),
            ("APPGRID_HOST", "http://env-host-7f3a:8080"),
            ("APPGRID_TIMEOUT_MS", "2500"),
        ];
        for (name, value) in vars {
            std::env::set_var(name, value);
        }

        let options = ClientOptions::from_env().unwrap();
        assert_eq!(options.app_key.as_deref(), Some("env-app-7f3a"));
        assert_eq!(options.device_id.as_deref(), Some("env-device-7f3a"));
        assert_eq!(options.session_key.as_deref(), Some("env-session-7f3a"));
        assert_eq!(options.gid.as_deref(), Some("env-group-7f3a"));
        assert_eq!(options.client_ip.as_deref(), Some("192.0.2.44"));
        assert_eq!(options.host.as_deref(), Some("http://env-host-7f3a:8080"));
        assert_eq!(options.request_timeout(), Some(Duration::from_millis(2500)));
        assert!(!options.no_cache);

        std::env::set_var("APPGRID_GID", "");
        std::env::remove_var("APPGRID_CLIENT_IP");
        let options = ClientOptions::from_env().unwrap();
        assert!(options.gid.is_none());
        assert!(options.client_ip.is_none());

        std::env::set_var("APPGRID_TIMEOUT_MS", "abc");
        let err = ClientOptions::from_env().unwrap_err();
        assert!(matches!(
            err,
            AppGridError::Configuration(ref m) if m.contains("APPGRID_TIMEOUT_MS")
        ));

        for (name, _) in vars {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn unset_hooks_default_to_no_ops() {
        let (_, hooks) = ClientOptions::new("app").device_id("d").validate().unwrap();
        hooks.log("ignored");
        hooks.session_key_changed("ignored");
    }

    #[test]
    fn debug_output_redacts_session_key() {
        let options = ClientOptions::new("app").device_id("d").session_key("secret");
        assert!(!format!("{options:?}").contains("secret"));
    }
}
