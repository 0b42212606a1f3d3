//! Per-user key-value storage, in either the private application scope or the
//! scope shared by the application group.

use serde_json::Value;

use crate::client::AppGridClient;
use crate::error::Result;
use crate::request::{segment, Query};
use crate::transport::Transport;
use crate::types::{Ack, UserDataScope};

fn user_path(scope: UserDataScope, user: &str) -> String {
    format!("/{}/{}", scope.path_segment(), segment(user))
}

fn key_path(scope: UserDataScope, user: &str, key: &str) -> String {
    format!("{}/{}", user_path(scope, user), segment(key))
}

impl<T: Transport> AppGridClient<T> {
    pub async fn get_all_data_by_user(&self, scope: UserDataScope, user: &str) -> Result<Value> {
        self.get_json(&user_path(scope, user), &Query::new()).await
    }

    pub async fn get_data_by_user_and_key(
        &self,
        scope: UserDataScope,
        user: &str,
        key: &str,
    ) -> Result<Value> {
        let mut query = Query::new();
        query.push("json", "true");
        self.get_json(&key_path(scope, user, key), &query).await
    }

    /// Replace the whole record of `user`.
    pub async fn set_user_data(
        &self,
        scope: UserDataScope,
        user: &str,
        data: &Value,
    ) -> Result<Ack> {
        self.post_json(&user_path(scope, user), data).await
    }

    pub async fn set_user_data_by_key(
        &self,
        scope: UserDataScope,
        user: &str,
        key: &str,
        data: &Value,
    ) -> Result<Ack> {
        self.post_json(&key_path(scope, user, key), data).await
    }

    pub async fn get_all_application_scope_data_by_user(&self, user: &str) -> Result<Value> {
        self.get_all_data_by_user(UserDataScope::Application, user)
            .await
    }

    pub async fn get_all_application_group_scope_data_by_user(&self, user: &str) -> Result<Value> {
        self.get_all_data_by_user(UserDataScope::ApplicationGroup, user)
            .await
    }

    pub async fn get_application_scope_data_by_user_and_key(
        &self,
        user: &str,
        key: &str,
    ) -> Result<Value> {
        self.get_data_by_user_and_key(UserDataScope::Application, user, key)
            .await
    }

    pub async fn get_application_group_scope_data_by_user_and_key(
        &self,
        user: &str,
        key: &str,
    ) -> Result<Value> {
        self.get_data_by_user_and_key(UserDataScope::ApplicationGroup, user, key)
            .await
    }

    pub async fn set_application_scope_user_data(&self, user: &str, data: &Value) -> Result<Ack> {
        self.set_user_data(UserDataScope::Application, user, data)
            .await
    }

    pub async fn set_application_group_scope_user_data(
        &self,
        user: &str,
        data: &Value,
    ) -> Result<Ack> {
        self.set_user_data(UserDataScope::ApplicationGroup, user, data)
            .await
    }

    pub async fn set_application_scope_user_data_by_key(
        &self,
        user: &str,
        key: &str,
        data: &Value,
    ) -> Result<Ack> {
        self.set_user_data_by_key(UserDataScope::Application, user, key, data)
            .await
    }

    pub async fn set_application_group_scope_user_data_by_key(
        &self,
        user: &str,
        key: &str,
        data: &Value,
    ) -> Result<Ack> {
        self.set_user_data_by_key(UserDataScope::ApplicationGroup, user, key, data)
            .await
    }
}
