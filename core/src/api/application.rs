use serde_json::Value;

use crate::client::AppGridClient;
use crate::error::Result;
use crate::request::Query;
use crate::transport::Transport;

impl<T: Transport> AppGridClient<T> {
    /// Current application status.
    pub async fn get_application_status(&self) -> Result<Value> {
        self.get_json("/status", &Query::new()).await
    }
}
