use crate::client::AppGridClient;
use crate::error::{AppGridError, Result};
use crate::transport::Transport;
use crate::types::{Ack, UsageEvent, UsageEventType};

const EVENT_LOG_PATH: &str = "/event/log";

impl<T: Transport> AppGridClient<T> {
    pub async fn send_usage_start_event(&self) -> Result<Ack> {
        self.send_usage_event(UsageEventType::Start, None).await
    }

    /// `retention_time` is in seconds.
    pub async fn send_usage_stop_event(&self, retention_time: Option<u64>) -> Result<Ack> {
        self.send_usage_event(UsageEventType::Quit, retention_time).await
    }

    async fn send_usage_event(
        &self,
        event_type: UsageEventType,
        retention_time: Option<u64>,
    ) -> Result<Ack> {
        let event = UsageEvent {
            event_type,
            retention_time,
        };
        let body = serde_json::to_value(&event)
            .map_err(|e| AppGridError::Serialization(e.to_string()))?;
        self.post_json(EVENT_LOG_PATH, &body).await
    }
}
