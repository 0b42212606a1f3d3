use serde_json::Value;

use crate::client::AppGridClient;
use crate::error::Result;
use crate::params::EntryParams;
use crate::request::segment;
use crate::transport::Transport;

impl<T: Transport> AppGridClient<T> {
    /// Content entries matching `params`.
    pub async fn get_entries(&self, params: &EntryParams) -> Result<Value> {
        self.get_json("/content/entries", &params.to_query()).await
    }

    pub async fn get_entry_by_id(&self, id: &str, params: &EntryParams) -> Result<Value> {
        let path = format!("/content/entry/{}", segment(id));
        self.get_json(&path, &params.to_query()).await
    }

    pub async fn get_entry_by_alias(&self, alias: &str, params: &EntryParams) -> Result<Value> {
        let path = format!("/content/entry/alias/{}", segment(alias));
        self.get_json(&path, &params.to_query()).await
    }
}
