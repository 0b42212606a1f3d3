use bytes::Bytes;
use serde_json::Value;

use crate::client::AppGridClient;
use crate::error::Result;
use crate::request::{segment, Query};
use crate::transport::Transport;

impl<T: Transport> AppGridClient<T> {
    /// Map of asset name to asset URL.
    pub async fn get_all_assets(&self) -> Result<Value> {
        self.get_json("/asset", &Query::new()).await
    }

    /// Raw bytes of one asset. Assets are public: this never creates a
    /// session and never retries.
    pub async fn get_asset_by_id(&self, id: &str) -> Result<Bytes> {
        self.get_raw(&format!("/asset/{}", segment(id))).await
    }
}
