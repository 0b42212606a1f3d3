use serde_json::Value;

use crate::client::AppGridClient;
use crate::error::Result;
use crate::request::{segment, Query};
use crate::transport::Transport;

impl<T: Transport> AppGridClient<T> {
    pub async fn get_all_metadata(&self) -> Result<Value> {
        self.get_json("/metadata", &Query::new()).await
    }

    pub async fn get_metadata_by_key(&self, key: &str) -> Result<Value> {
        self.get_json(&format!("/metadata/{}", segment(key)), &Query::new())
            .await
    }

    /// Several metadata keys in one request.
    pub async fn get_metadata_by_keys<S: AsRef<str>>(&self, keys: &[S]) -> Result<Value> {
        let keys = keys
            .iter()
            .map(|k| segment(k.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        self.get_json(&format!("/metadata/{keys}"), &Query::new())
            .await
    }
}
