use serde_json::Value;

use crate::client::AppGridClient;
use crate::error::{AppGridError, Result};
use crate::request::Query;
use crate::transport::Transport;
use crate::types::{Ack, LogDetails, LogEvent, LogLevel};

impl<T: Transport> AppGridClient<T> {
    /// The log level configured for this application.
    pub async fn get_log_level(&self) -> Result<String> {
        let json = self.get_json("/application/log/level", &Query::new()).await?;
        json.get("logLevel")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppGridError::Deserialization(format!("no logLevel in {json}")))
    }

    /// Send one application log line.
    ///
    /// `level` must be one of `debug`, `info`, `warn` or `error`; anything
    /// else fails with `Validation` before a request is made.
    pub async fn send_log(
        &self,
        level: &str,
        details: &LogDetails,
        metadata: &[Value],
    ) -> Result<Ack> {
        let level: LogLevel = level.parse()?;
        let event = LogEvent::new(details, metadata)?;
        let body = serde_json::to_value(&event)
            .map_err(|e| AppGridError::Serialization(e.to_string()))?;
        self.post_json(&format!("/application/log/{level}"), &body)
            .await
    }
}
