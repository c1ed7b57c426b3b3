//! reqwest implementation of [`Backend`] for the hosted BaaS.
//!
//! - tables: `{url}/rest/v1/{table}`
//! - database functions: `{url}/rest/v1/rpc/{name}`
//! - auth: `{url}/auth/v1/...`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use common::{AppError, AppResult, BaasConfig};
use domain::{AuthSession, AuthUser, UserMetadata};

use super::{Backend, Caller, Query};

const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "return=representation,resolution=merge-duplicates";

/// HTTP client for the BaaS REST, RPC and auth APIs.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl HttpBackend {
    pub fn new(config: &BaasConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        debug!("BaaS client targeting {}", config.url);

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: String, caller: &Caller) -> RequestBuilder {
        let bearer = caller.access_token().unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn write(&self, method: Method, table: &str, caller: &Caller, prefer: &str) -> RequestBuilder {
        self.request(method, self.rest_url(table), caller)
            .header("Prefer", prefer)
    }
}

/// Send a request and decode the JSON body (empty bodies decode to `null`).
async fn send(builder: RequestBuilder) -> AppResult<Value> {
    let response = builder.send().await.map_err(transport_error)?;
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(upstream_error(status.as_u16(), &body));
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body)
        .map_err(|e| AppError::internal(format!("Invalid JSON from BaaS: {}", e)))
}

fn into_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::internal(format!("Unexpected BaaS auth payload: {}", e)))
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() || e.is_connect() {
        warn!("BaaS unreachable: {}", e);
        AppError::service_unavailable("baas")
    } else {
        AppError::internal(format!("BaaS request failed: {}", e))
    }
}

/// Extract the remote error message; the REST, RPC and auth APIs use
/// different field names for it.
pub(crate) fn upstream_error(status: u16, body: &str) -> AppError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error_description", "msg", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(String::from))
        })
        .unwrap_or_default();

    AppError::upstream(status, message)
}

fn refuse_unfiltered(query: &Query) -> AppResult<()> {
    if query.has_filters() {
        Ok(())
    } else {
        Err(AppError::internal("Refusing to write without a row filter"))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn select(&self, caller: &Caller, table: &str, query: &Query) -> AppResult<Vec<Value>> {
        let builder = self
            .request(Method::GET, self.rest_url(table), caller)
            .query(&query.to_pairs());
        send(builder).await.map(into_rows)
    }

    async fn insert(&self, caller: &Caller, table: &str, rows: Value) -> AppResult<Vec<Value>> {
        let builder = self
            .write(Method::POST, table, caller, RETURN_REPRESENTATION)
            .json(&rows);
        send(builder).await.map(into_rows)
    }

    async fn update(
        &self,
        caller: &Caller,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> AppResult<Vec<Value>> {
        refuse_unfiltered(query)?;
        let builder = self
            .write(Method::PATCH, table, caller, RETURN_REPRESENTATION)
            .query(&query.to_pairs())
            .json(&patch);
        send(builder).await.map(into_rows)
    }

    async fn upsert(
        &self,
        caller: &Caller,
        table: &str,
        rows: Value,
        on_conflict: &str,
    ) -> AppResult<Vec<Value>> {
        let builder = self
            .write(Method::POST, table, caller, MERGE_DUPLICATES)
            .query(&[("on_conflict", on_conflict)])
            .json(&rows);
        send(builder).await.map(into_rows)
    }

    async fn delete(&self, caller: &Caller, table: &str, query: &Query) -> AppResult<Vec<Value>> {
        refuse_unfiltered(query)?;
        let builder = self
            .write(Method::DELETE, table, caller, RETURN_REPRESENTATION)
            .query(&query.to_pairs());
        send(builder).await.map(into_rows)
    }

    async fn rpc(&self, caller: &Caller, function: &str, args: Value) -> AppResult<Value> {
        let url = self.rest_url(&format!("rpc/{}", function));
        let builder = self.request(Method::POST, url, caller).json(&args);
        send(builder).await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let builder = self
            .request(Method::POST, self.auth_url("token"), &Caller::Anonymous)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        match send(builder).await {
            Ok(value) => decode(value),
            Err(AppError::Upstream { status, .. }) if status == StatusCode::BAD_REQUEST => {
                Err(AppError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> AppResult<AuthUser> {
        let builder = self
            .request(Method::POST, self.auth_url("signup"), &Caller::Anonymous)
            .json(&json!({ "email": email, "password": password, "data": metadata }));

        let value = send(builder).await?;
        // Auto-confirming projects wrap the user in a session
        match value.get("user") {
            Some(user) if user.is_object() => decode(user.clone()),
            _ => decode(value),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> AppResult<AuthSession> {
        let builder = self
            .request(Method::POST, self.auth_url("token"), &Caller::Anonymous)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));

        match send(builder).await {
            Ok(value) => decode(value),
            Err(AppError::Upstream { status, .. }) if status == StatusCode::BAD_REQUEST => {
                Err(AppError::SessionExpired)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let builder = self.request(
            Method::POST,
            self.auth_url("logout"),
            &Caller::user(access_token),
        );
        send(builder).await.map(|_| ())
    }
}
