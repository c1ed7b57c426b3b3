//! Backend abstraction over the hosted auth + database service.

use async_trait::async_trait;
use serde_json::Value;

use common::AppResult;
use domain::{AuthSession, AuthUser, UserMetadata};

use super::Query;

#[cfg(test)]
use mockall::automock;

/// Identity a backend call is made with.
///
/// User calls carry the caller's access token so the database's row-level
/// security applies; anonymous calls only carry the public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User { access_token: String },
}

impl Caller {
    pub fn user(access_token: impl Into<String>) -> Self {
        Caller::User {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::User { access_token } => Some(access_token),
        }
    }
}

/// Operations the gateway forwards to the BaaS.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read rows matching `query`
    async fn select(&self, caller: &Caller, table: &str, query: &Query) -> AppResult<Vec<Value>>;

    /// Insert one row or an array of rows; returns the stored rows
    async fn insert(&self, caller: &Caller, table: &str, rows: Value) -> AppResult<Vec<Value>>;

    /// Patch rows matching `query`; returns the updated rows
    async fn update(
        &self,
        caller: &Caller,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> AppResult<Vec<Value>>;

    /// Insert or merge rows on the `on_conflict` columns
    async fn upsert(
        &self,
        caller: &Caller,
        table: &str,
        rows: Value,
        on_conflict: &str,
    ) -> AppResult<Vec<Value>>;

    /// Delete rows matching `query`; returns the deleted rows
    async fn delete(&self, caller: &Caller, table: &str, query: &Query) -> AppResult<Vec<Value>>;

    /// Invoke a database function by name
    async fn rpc(&self, caller: &Caller, function: &str, args: Value) -> AppResult<Value>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> AppResult<AuthUser>;

    async fn refresh_session(&self, refresh_token: &str) -> AppResult<AuthSession>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;
}
