use serde_json::Value;

use crate::client::AppGridClient;
use crate::error::Result;
use crate::request::Query;
use crate::transport::Transport;

impl<T: Transport> AppGridClient<T> {
    pub async fn get_all_enabled_plugins(&self) -> Result<Value> {
        self.get_json("/plugins", &Query::new()).await
    }
}
