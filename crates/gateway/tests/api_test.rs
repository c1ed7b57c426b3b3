//! Integration tests for API endpoints.
//!
//! The router runs against an in-memory backend so the full middleware
//! stack (locale, auth, permissions) is exercised without a BaaS or Redis.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{i18n, AppError, AppResult};
use domain::{AuthSession, AuthUser, Locale, UserMetadata};
use gateway_lib::clients::{
    names::{function, table},
    Backend, BaasClient, Caller, Query,
};
use gateway_lib::config::GatewayConfig;
use gateway_lib::routes::create_router;
use gateway_lib::state::AppState;

const SECRET: &str = "test-secret-key-for-testing-only-32chars";
const PASSWORD: &str = "correct horse battery";
const REFRESH_TOKEN: &str = "refresh-1";

// =============================================================================
// In-memory backend
// =============================================================================

/// Stores rows per table, honours `eq` filters and plays the database
/// functions the handlers call.
#[derive(Default)]
struct FakeBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    rpc_calls: Mutex<Vec<(String, Value)>>,
    refreshed_with: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn seed(&self, table: &str, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn rpc_names(&self) -> Vec<String> {
        self.rpc_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn rpc_args(&self, name: &str) -> Option<Value> {
        self.rpc_calls
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, args)| args.clone())
    }

    fn invitation_by_token(&self, token: &str) -> Option<Value> {
        self.rows(table::INVITATIONS)
            .into_iter()
            .find(|row| row["token"] == token)
    }
}

fn issued_session(access_token: &str, refresh_token: &str) -> AuthSession {
    AuthSession {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        user: None,
    }
}

fn cell(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => Some("null".to_string()),
        other => Some(other.to_string()),
    }
}

fn matches(row: &Value, query: &Query) -> bool {
    query.to_pairs().iter().all(|(column, filter)| match filter.strip_prefix("eq.") {
        Some(expected) => cell(row, column).as_deref() == Some(expected),
        None => true,
    })
}

fn paged(rows: Vec<Value>, query: &Query) -> Vec<Value> {
    let pairs = query.to_pairs();
    let get = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.parse::<usize>().ok())
    };
    let offset = get("offset").unwrap_or(0);
    let limit = get("limit").unwrap_or(usize::MAX);
    rows.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl Backend for FakeBackend {
    async fn select(&self, _caller: &Caller, table: &str, query: &Query) -> AppResult<Vec<Value>> {
        let rows = self
            .rows(table)
            .into_iter()
            .filter(|row| matches(row, query))
            .collect();
        Ok(paged(rows, query))
    }

    async fn insert(&self, _caller: &Caller, table: &str, rows: Value) -> AppResult<Vec<Value>> {
        let mut row = rows;
        if row.get("id").is_none() {
            row["id"] = json!(Uuid::new_v4());
        }
        self.seed(table, row.clone());
        Ok(vec![row])
    }

    async fn update(
        &self,
        _caller: &Caller,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> AppResult<Vec<Value>> {
        let mut tables = self.tables.lock().unwrap();
        let mut updated = Vec::new();
        for row in tables.entry(table.to_string()).or_default().iter_mut() {
            if matches(row, query) {
                if let (Value::Object(fields), Value::Object(changes)) = (&mut *row, &patch) {
                    for (k, v) in changes {
                        fields.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn upsert(
        &self,
        _caller: &Caller,
        table: &str,
        rows: Value,
        _on_conflict: &str,
    ) -> AppResult<Vec<Value>> {
        let rows = match rows {
            Value::Array(rows) => rows,
            row => vec![row],
        };
        let stored: Vec<Value> = rows
            .into_iter()
            .map(|mut row| {
                row["id"] = json!(Uuid::new_v4());
                row
            })
            .collect();
        for row in &stored {
            self.seed(table, row.clone());
        }
        Ok(stored)
    }

    async fn delete(&self, _caller: &Caller, table: &str, query: &Query) -> AppResult<Vec<Value>> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|row| matches(row, query));
        *rows = kept;
        Ok(removed)
    }

    async fn rpc(&self, _caller: &Caller, name: &str, args: Value) -> AppResult<Value> {
        self.rpc_calls
            .lock()
            .unwrap()
            .push((name.to_string(), args.clone()));

        match name {
            function::CREATE_STORE => {
                let store = json!({
                    "id": Uuid::new_v4(),
                    "name": args["p_name"],
                    "description": args["p_description"],
                    "timezone": args["p_timezone"],
                    "owner_id": Uuid::new_v4(),
                    "created_at": Utc::now(),
                    "updated_at": Utc::now()
                });
                self.seed(table::STORES, store.clone());
                Ok(store)
            }
            function::CREATE_INVITATION => {
                let days = args["p_expires_in_days"].as_i64().unwrap_or(7);
                let invitation = json!({
                    "id": Uuid::new_v4(),
                    "store_id": args["p_store_id"],
                    "email": args["p_email"],
                    "role": args["p_role"],
                    "token": Uuid::new_v4().simple().to_string(),
                    "status": "PENDING",
                    "invited_by": Uuid::new_v4(),
                    "expires_at": Utc::now() + Duration::days(days),
                    "created_at": Utc::now()
                });
                self.seed(table::INVITATIONS, invitation.clone());
                // Set-returning function
                Ok(json!([invitation]))
            }
            function::GET_INVITATION => {
                let token = args["p_token"].as_str().unwrap_or_default();
                Ok(self.invitation_by_token(token).map_or(Value::Null, |row| {
                    json!({
                        "store_id": row["store_id"],
                        "email": row["email"],
                        "role": row["role"],
                        "status": row["status"],
                        "expires_at": row["expires_at"]
                    })
                }))
            }
            function::ACCEPT_INVITATION => {
                let token = args["p_token"].as_str().unwrap_or_default();
                let Some(row) = self.invitation_by_token(token) else {
                    return Ok(Value::Null);
                };
                let member = membership(
                    serde_json::from_value(row["store_id"].clone()).unwrap(),
                    Uuid::new_v4(),
                    row["role"].as_str().unwrap_or_default(),
                );
                self.seed(table::USER_STORE_ROLES, member.clone());
                Ok(member)
            }
            _ => Ok(Value::Null),
        }
    }

    async fn sign_in_with_password(&self, _email: &str, password: &str) -> AppResult<AuthSession> {
        if password == PASSWORD {
            Ok(issued_session("access-1", REFRESH_TOKEN))
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: &UserMetadata,
    ) -> AppResult<AuthUser> {
        Err(AppError::internal("sign-up is not used in these tests"))
    }

    async fn refresh_session(&self, refresh_token: &str) -> AppResult<AuthSession> {
        self.refreshed_with
            .lock()
            .unwrap()
            .push(refresh_token.to_string());
        if refresh_token == REFRESH_TOKEN {
            Ok(issued_session("access-2", "refresh-2"))
        } else {
            Err(AppError::SessionExpired)
        }
    }

    async fn sign_out(&self, _access_token: &str) -> AppResult<()> {
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn app(backend: Arc<FakeBackend>) -> Router {
    let mut config = GatewayConfig::default();
    config.baas.anon_key = "anon".to_string();
    config.baas.jwt_secret = SECRET.to_string();
    create_router(AppState::new(BaasClient::new(backend), None, config))
}

fn token_expiring_at(user_id: Uuid, exp: i64) -> String {
    let claims = json!({
        "sub": user_id,
        "email": "owner@example.com",
        "exp": exp,
        "aud": "authenticated",
        "role": "authenticated"
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn token(user_id: Uuid) -> String {
    token_expiring_at(user_id, Utc::now().timestamp() + 3600)
}

fn membership(store_id: Uuid, user_id: Uuid, role: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "user_id": user_id,
        "store_id": store_id,
        "role": role,
        "is_active": true,
        "granted_by": null,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

fn break_rule(store_id: Uuid) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "store_id": store_id,
        "name": "Lunch",
        "min_work_minutes": 240,
        "break_minutes": 30,
        "is_paid": false
    })
}

fn store(store_id: Uuid) -> Value {
    json!({
        "id": store_id,
        "name": "Corner Cafe",
        "timezone": "Asia/Seoul",
        "owner_id": Uuid::new_v4(),
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

fn invitation(store_id: Uuid, role: &str, status: &str, expires_in: Duration) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "store_id": store_id,
        "email": "staff@example.com",
        "role": role,
        "token": Uuid::new_v4().simple().to_string(),
        "status": status,
        "invited_by": Uuid::new_v4(),
        "expires_at": Utc::now() + expires_in,
        "created_at": "2024-01-01T00:00:00Z"
    })
}

fn id_of(row: &Value) -> String {
    row["id"].as_str().unwrap().to_string()
}

/// Backend with one store and a member holding `role` in it.
fn store_with_member(role: &str) -> (Arc<FakeBackend>, Uuid, Uuid) {
    let backend = Arc::new(FakeBackend::default());
    let store_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    backend.seed(table::USER_STORE_ROLES, membership(store_id, user_id, role));
    (backend, store_id, user_id)
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

fn json_request(method: &str, uri: &str, user_id: Uuid, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token(user_id)))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT_LANGUAGE, "en")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

fn header_value(response: &Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_disabled_cache() {
    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["services"]["redis"]["status"], "disabled");
    assert_eq!(body["services"]["baas"]["status"], "healthy");
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(get("/api/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn expired_token_reports_session_expired() {
    let expired = token_expiring_at(Uuid::new_v4(), Utc::now().timestamp() - 60);
    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(
            get("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", expired))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "SESSION_EXPIRED");
}

#[tokio::test]
async fn malformed_token_is_auth_error() {
    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(
            get("/api/me")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn access_token_cookie_is_accepted() {
    let (backend, store_id, user_id) = store_with_member("PART_TIMER");
    let response = app(backend)
        .oneshot(
            get("/api/me")
                .header(header::COOKIE, format!("wk-access-token={}", token(user_id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], json!(user_id));
    assert_eq!(body["memberships"][0]["store_id"], json!(store_id));
    assert_eq!(body["memberships"][0]["role"], "PART_TIMER");
}

// =============================================================================
// Permissions and schedule settings
// =============================================================================

#[tokio::test]
async fn part_timer_cannot_create_break_rule() {
    let (backend, store_id, user_id) = store_with_member("PART_TIMER");
    let request = json_request(
        "POST",
        &format!("/api/stores/{}/break-rules", store_id),
        user_id,
        json!({ "name": "Lunch", "min_work_minutes": 240, "break_minutes": 30 }),
    );

    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"]["code"], "FORBIDDEN");
    assert!(backend.rows(table::BREAK_RULES).is_empty());
}

#[tokio::test]
async fn non_member_is_refused_in_the_callers_language() {
    let backend = Arc::new(FakeBackend::default());
    let store_id = Uuid::new_v4();
    let response = app(backend)
        .oneshot(
            get(&format!("/api/stores/{}/break-rules", store_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token(Uuid::new_v4())))
                .header(header::ACCEPT_LANGUAGE, "ja-JP,ja;q=0.9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        header_value(&response, header::CONTENT_LANGUAGE).as_deref(),
        Some("ja")
    );
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(
        body["error"]["message"],
        i18n::translate("error.forbidden", Locale::Ja).into_owned()
    );
}

#[tokio::test]
async fn break_longer_than_work_is_a_validation_error() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let request = json_request(
        "POST",
        &format!("/api/stores/{}/break-rules", store_id),
        user_id,
        json!({ "name": "Odd", "min_work_minutes": 60, "break_minutes": 90 }),
    );

    let response = app(backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["message"],
        i18n::translate("validation.break_shorter_than_work", Locale::En).into_owned()
    );
}

#[tokio::test]
async fn master_creates_break_rule_and_records_audit() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let request = json_request(
        "POST",
        &format!("/api/stores/{}/break-rules", store_id),
        user_id,
        json!({ "name": "Lunch", "min_work_minutes": 240, "break_minutes": 30, "is_paid": true }),
    );

    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["store_id"], json!(store_id));
    assert_eq!(body["is_paid"], true);
    assert_eq!(backend.rows(table::BREAK_RULES).len(), 1);
    assert!(backend.rpc_names().iter().any(|n| n == "log_audit_event"));
}

#[tokio::test]
async fn sub_manager_updates_break_rule() {
    let (backend, store_id, user_id) = store_with_member("SUB_MANAGER");
    let rule = break_rule(store_id);
    let rule_id = rule["id"].as_str().unwrap().to_string();
    backend.seed(table::BREAK_RULES, rule);

    let request = json_request(
        "PATCH",
        &format!("/api/stores/{}/break-rules/{}", store_id, rule_id),
        user_id,
        json!({ "break_minutes": 45 }),
    );
    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["break_minutes"], 45);
    assert_eq!(backend.rows(table::BREAK_RULES)[0]["break_minutes"], 45);
}

#[tokio::test]
async fn patch_that_breaks_the_stored_row_is_rejected() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let rule = break_rule(store_id);
    let rule_id = rule["id"].as_str().unwrap().to_string();
    backend.seed(table::BREAK_RULES, rule);

    // 240 minutes of work, 240 minutes of break
    let request = json_request(
        "PATCH",
        &format!("/api/stores/{}/break-rules/{}", store_id, rule_id),
        user_id,
        json!({ "break_minutes": 240 }),
    );
    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.rows(table::BREAK_RULES)[0]["break_minutes"], 30);
}

#[tokio::test]
async fn row_from_another_store_is_not_found() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let foreign = break_rule(Uuid::new_v4());
    let foreign_id = foreign["id"].as_str().unwrap().to_string();
    backend.seed(table::BREAK_RULES, foreign);

    let request = json_request(
        "DELETE",
        &format!("/api/stores/{}/break-rules/{}", store_id, foreign_id),
        user_id,
        json!({}),
    );
    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(backend.rows(table::BREAK_RULES).len(), 1);
}

#[tokio::test]
async fn empty_patch_is_rejected() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let request = json_request(
        "PATCH",
        &format!("/api/stores/{}/break-rules/{}", store_id, Uuid::new_v4()),
        user_id,
        json!({}),
    );

    let response = app(backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn duplicate_business_hour_weekday_is_rejected() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let request = json_request(
        "PUT",
        &format!("/api/stores/{}/business-hours", store_id),
        user_id,
        json!({ "hours": [
            { "weekday": 1, "open_time": "09:00", "close_time": "18:00" },
            { "weekday": 1, "is_closed": true }
        ]}),
    );

    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(backend.rows(table::BUSINESS_HOURS).is_empty());
}

#[tokio::test]
async fn business_hours_are_replaced_for_the_store() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let request = json_request(
        "PUT",
        &format!("/api/stores/{}/business-hours", store_id),
        user_id,
        json!({ "hours": [
            { "weekday": 2, "open_time": "09:00", "close_time": "18:00" },
            { "weekday": 0, "is_closed": true }
        ]}),
    );

    let response = app(backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["weekday"], 0);
    assert_eq!(body[1]["weekday"], 2);
    assert_eq!(body[1]["store_id"], json!(store_id));
}

#[tokio::test]
async fn audit_log_is_paginated_for_masters_only() {
    let (backend, store_id, master_id) = store_with_member("MASTER");
    let sub_manager_id = Uuid::new_v4();
    backend.seed(
        table::USER_STORE_ROLES,
        membership(store_id, sub_manager_id, "SUB_MANAGER"),
    );
    for _ in 0..3 {
        backend.seed(
            table::AUDIT_LOGS,
            json!({
                "id": Uuid::new_v4(),
                "store_id": store_id,
                "actor_id": master_id,
                "action": "CREATE",
                "target_type": "break_rule",
                "target_id": null,
                "details": {},
                "created_at": "2024-05-01T09:00:00Z"
            }),
        );
    }
    let app = app(backend);

    let uri = format!("/api/stores/{}/audit-logs?page=1&per_page=2", store_id);
    let response = app
        .clone()
        .oneshot(json_request("GET", &uri, master_id, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["meta"]["has_more"], true);

    let response = app
        .oneshot(json_request("GET", &uri, sub_manager_id, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn huge_audit_page_returns_an_empty_page() {
    let (backend, store_id, master_id) = store_with_member("MASTER");
    backend.seed(
        table::AUDIT_LOGS,
        json!({
            "id": Uuid::new_v4(),
            "store_id": store_id,
            "actor_id": master_id,
            "action": "DELETE",
            "target_type": "holiday",
            "target_id": null,
            "details": {},
            "created_at": "2024-05-01T09:00:00Z"
        }),
    );
    let uri = format!(
        "/api/stores/{}/audit-logs?page={}&per_page=100",
        store_id,
        u64::MAX
    );

    let response = app(backend)
        .oneshot(json_request("GET", &uri, master_id, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["has_more"], false);
}

#[tokio::test]
async fn settings_collect_every_schedule_table_of_the_store() {
    let (backend, store_id, user_id) = store_with_member("PART_TIMER");
    backend.seed(table::BREAK_RULES, break_rule(store_id));
    backend.seed(table::BREAK_RULES, break_rule(Uuid::new_v4()));
    backend.seed(
        table::BUSINESS_HOURS,
        json!({
            "id": Uuid::new_v4(), "store_id": store_id, "weekday": 1,
            "open_time": "09:00:00", "close_time": "18:00:00", "is_closed": false
        }),
    );
    backend.seed(
        table::HOLIDAYS,
        json!({
            "id": Uuid::new_v4(), "store_id": store_id, "date": "2024-09-17",
            "name": "Chuseok", "is_closed": true
        }),
    );
    backend.seed(
        table::WORK_ITEMS,
        json!({
            "id": Uuid::new_v4(), "store_id": store_id, "name": "Register",
            "color": "#4F46E5", "is_active": true
        }),
    );
    backend.seed(
        table::STAFFING_TARGETS,
        json!({
            "id": Uuid::new_v4(), "store_id": store_id, "weekday": 5,
            "start_time": "11:00:00", "end_time": "14:00:00", "min_staff": 2, "max_staff": 4
        }),
    );
    backend.seed(
        table::JOB_ROLES,
        json!({
            "id": Uuid::new_v4(), "store_id": store_id, "name": "Barista", "is_active": true
        }),
    );

    let response = app(backend)
        .oneshot(json_request(
            "GET",
            &format!("/api/stores/{}/settings", store_id),
            user_id,
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    for key in [
        "business_hours",
        "holidays",
        "break_rules",
        "work_items",
        "staffing_targets",
        "job_roles",
    ] {
        assert_eq!(body[key].as_array().map(Vec::len), Some(1), "{}", key);
    }
    assert_eq!(body["break_rules"][0]["store_id"], json!(store_id));
}

// =============================================================================
// Malformed parameters
// =============================================================================

#[tokio::test]
async fn malformed_store_id_is_an_enveloped_validation_error() {
    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(
            get("/api/stores/not-a-uuid")
                .header(header::AUTHORIZATION, format!("Bearer {}", token(Uuid::new_v4())))
                .header(header::ACCEPT_LANGUAGE, "ja")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        header_value(&response, header::CONTENT_TYPE).as_deref(),
        Some("application/json")
    );
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["message"],
        i18n::translate("error.validation", Locale::Ja).into_owned()
    );
}

#[tokio::test]
async fn malformed_query_values_are_validation_errors() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let app = app(backend);

    for uri in [
        format!("/api/stores/{}/holidays?from=yesterday", store_id),
        format!("/api/stores/{}/invitations?status=LOST", store_id),
        format!("/api/stores/{}/audit-logs?page=-1", store_id),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("GET", &uri, user_id, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(
            body_json(response).await["error"]["code"],
            "VALIDATION_ERROR",
            "{}",
            uri
        );
    }
}

// =============================================================================
// Stores
// =============================================================================

#[tokio::test]
async fn creating_a_store_goes_through_the_database_function() {
    let backend = Arc::new(FakeBackend::default());
    let request = json_request(
        "POST",
        "/api/stores",
        Uuid::new_v4(),
        json!({ "name": "  Corner Cafe  " }),
    );

    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["name"], "Corner Cafe");
    let args = backend.rpc_args(function::CREATE_STORE).unwrap();
    assert_eq!(args["p_timezone"], "Asia/Seoul");
    assert!(backend.rpc_names().iter().any(|n| n == function::LOG_AUDIT_EVENT));
}

#[tokio::test]
async fn only_masters_edit_or_delete_a_store() {
    let (backend, store_id, master_id) = store_with_member("MASTER");
    let sub_manager_id = Uuid::new_v4();
    backend.seed(
        table::USER_STORE_ROLES,
        membership(store_id, sub_manager_id, "SUB_MANAGER"),
    );
    backend.seed(table::STORES, store(store_id));
    let app = app(backend.clone());
    let uri = format!("/api/stores/{}", store_id);

    let response = app
        .clone()
        .oneshot(json_request("PATCH", &uri, sub_manager_id, json!({ "name": "Mine" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(json_request("DELETE", &uri, sub_manager_id, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(backend.rows(table::STORES).len(), 1);

    let response = app
        .clone()
        .oneshot(json_request("PATCH", &uri, master_id, json!({ "name": "Corner Bistro" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Corner Bistro");

    let response = app
        .oneshot(json_request("DELETE", &uri, master_id, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(backend.rows(table::STORES).is_empty());
}

// =============================================================================
// Invitations
// =============================================================================

#[tokio::test]
async fn sub_manager_cannot_invite_another_sub_manager() {
    let (backend, store_id, user_id) = store_with_member("SUB_MANAGER");
    let request = json_request(
        "POST",
        &format!("/api/stores/{}/invitations", store_id),
        user_id,
        json!({ "email": "peer@example.com", "role": "SUB_MANAGER" }),
    );

    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(backend.rpc_args(function::CREATE_INVITATION).is_none());
}

#[tokio::test]
async fn nobody_can_invite_a_master() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let request = json_request(
        "POST",
        &format!("/api/stores/{}/invitations", store_id),
        user_id,
        json!({ "email": "boss@example.com", "role": "MASTER" }),
    );

    let response = app(backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["message"],
        i18n::translate("validation.role_not_invitable", Locale::En).into_owned()
    );
}

#[tokio::test]
async fn sub_manager_invites_a_part_timer_with_default_expiry() {
    let (backend, store_id, user_id) = store_with_member("SUB_MANAGER");
    let request = json_request(
        "POST",
        &format!("/api/stores/{}/invitations", store_id),
        user_id,
        json!({ "email": "New.Staff@Example.com", "role": "PART_TIMER" }),
    );

    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["role"], "PART_TIMER");
    let args = backend.rpc_args(function::CREATE_INVITATION).unwrap();
    assert_eq!(args["p_email"], "new.staff@example.com");
    assert_eq!(args["p_expires_in_days"], 7);
}

#[tokio::test]
async fn cancelling_a_settled_invitation_conflicts() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let accepted = invitation(store_id, "PART_TIMER", "ACCEPTED", Duration::days(3));
    let uri = format!("/api/stores/{}/invitations/{}", store_id, id_of(&accepted));
    backend.seed(table::INVITATIONS, accepted);

    let response = app(backend.clone())
        .oneshot(json_request("DELETE", &uri, user_id, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["code"], "CONFLICT");
    assert_eq!(backend.rows(table::INVITATIONS)[0]["status"], "ACCEPTED");
}

#[tokio::test]
async fn pending_invitation_is_cancelled() {
    let (backend, store_id, user_id) = store_with_member("MASTER");
    let pending = invitation(store_id, "PART_TIMER", "PENDING", Duration::days(3));
    let uri = format!("/api/stores/{}/invitations/{}", store_id, id_of(&pending));
    backend.seed(table::INVITATIONS, pending);

    let response = app(backend.clone())
        .oneshot(json_request("DELETE", &uri, user_id, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "CANCELLED");
    assert_eq!(backend.rows(table::INVITATIONS)[0]["status"], "CANCELLED");
}

#[tokio::test]
async fn public_lookup_reports_lapsed_invitation_as_expired() {
    let backend = Arc::new(FakeBackend::default());
    let lapsed = invitation(Uuid::new_v4(), "PART_TIMER", "PENDING", Duration::days(-1));
    let token = lapsed["token"].as_str().unwrap().to_string();
    backend.seed(table::INVITATIONS, lapsed);

    let response = app(backend)
        .oneshot(
            get(&format!("/api/invitations/{}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "EXPIRED");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn expired_invitation_cannot_be_accepted() {
    let backend = Arc::new(FakeBackend::default());
    let lapsed = invitation(Uuid::new_v4(), "PART_TIMER", "PENDING", Duration::days(-1));
    let token = lapsed["token"].as_str().unwrap().to_string();
    backend.seed(table::INVITATIONS, lapsed);

    let response = app(backend.clone())
        .oneshot(json_request(
            "POST",
            &format!("/api/invitations/{}/accept", token),
            Uuid::new_v4(),
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(
        body["error"]["message"],
        i18n::translate("error.invitation_expired", Locale::En).into_owned()
    );
    assert!(backend.rpc_args(function::ACCEPT_INVITATION).is_none());
}

#[tokio::test]
async fn pending_invitation_is_accepted_into_the_store() {
    let backend = Arc::new(FakeBackend::default());
    let store_id = Uuid::new_v4();
    let pending = invitation(store_id, "SUB_MANAGER", "PENDING", Duration::days(2));
    let token = pending["token"].as_str().unwrap().to_string();
    backend.seed(table::INVITATIONS, pending);

    let response = app(backend.clone())
        .oneshot(json_request(
            "POST",
            &format!("/api/invitations/{}/accept", token),
            Uuid::new_v4(),
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["store_id"], json!(store_id));
    assert_eq!(body["role"], "SUB_MANAGER");
    assert!(backend.rpc_args(function::ACCEPT_INVITATION).is_some());
}

// =============================================================================
// Members
// =============================================================================

#[tokio::test]
async fn members_cannot_change_their_own_membership() {
    let (backend, store_id, master_id) = store_with_member("MASTER");
    let app = app(backend.clone());
    let base = format!("/api/stores/{}/members/{}", store_id, master_id);

    for (method, uri, body) in [
        ("DELETE", base.clone(), json!({})),
        ("POST", format!("{}/deactivate", base), json!({})),
        ("PUT", format!("{}/role", base), json!({ "role": "PART_TIMER" })),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(method, &uri, master_id, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(
            body_json(response).await["error"]["message"],
            i18n::translate("error.self_modification", Locale::En).into_owned()
        );
    }
    assert!(backend.rpc_names().is_empty());
}

#[tokio::test]
async fn equal_rank_members_cannot_manage_each_other() {
    let (backend, store_id, sub_manager_id) = store_with_member("SUB_MANAGER");
    let peer_id = Uuid::new_v4();
    backend.seed(
        table::USER_STORE_ROLES,
        membership(store_id, peer_id, "SUB_MANAGER"),
    );
    let app = app(backend.clone());
    let base = format!("/api/stores/{}/members/{}", store_id, peer_id);

    for (method, uri) in [("DELETE", base.clone()), ("POST", format!("{}/deactivate", base))] {
        let response = app
            .clone()
            .oneshot(json_request(method, &uri, sub_manager_id, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }
    assert!(backend.rpc_names().is_empty());
}

#[tokio::test]
async fn sub_manager_cannot_change_roles() {
    let (backend, store_id, sub_manager_id) = store_with_member("SUB_MANAGER");
    let part_timer_id = Uuid::new_v4();
    backend.seed(
        table::USER_STORE_ROLES,
        membership(store_id, part_timer_id, "PART_TIMER"),
    );

    let response = app(backend.clone())
        .oneshot(json_request(
            "PUT",
            &format!("/api/stores/{}/members/{}/role", store_id, part_timer_id),
            sub_manager_id,
            json!({ "role": "SUB_MANAGER" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(backend.rpc_args(function::GRANT_USER_ROLE).is_none());
}

#[tokio::test]
async fn master_promotes_and_deactivates_a_part_timer() {
    let (backend, store_id, master_id) = store_with_member("MASTER");
    let part_timer_id = Uuid::new_v4();
    backend.seed(
        table::USER_STORE_ROLES,
        membership(store_id, part_timer_id, "PART_TIMER"),
    );
    let app = app(backend.clone());
    let base = format!("/api/stores/{}/members/{}", store_id, part_timer_id);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("{}/role", base),
            master_id,
            json!({ "role": "SUB_MANAGER" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let args = backend.rpc_args(function::GRANT_USER_ROLE).unwrap();
    assert_eq!(args["p_role"], "SUB_MANAGER");
    assert_eq!(args["p_user_id"], json!(part_timer_id));

    let response = app
        .oneshot(json_request("POST", &format!("{}/deactivate", base), master_id, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(backend.rpc_args(function::DEACTIVATE_USER).is_some());
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn sign_in_sets_http_only_session_cookies() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/sign-in")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "Owner@Example.com", "password": PASSWORD }).to_string(),
        ))
        .unwrap();

    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    for name in ["wk-access-token=access-1", "wk-refresh-token=refresh-1"] {
        let cookie = cookies.iter().find(|c| c.starts_with(name));
        assert!(cookie.is_some_and(|c| c.contains("HttpOnly")), "{:?}", cookies);
    }
    assert_eq!(body_json(response).await["access_token"], "access-1");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/sign-in")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "owner@example.com", "password": "guess" }).to_string(),
        ))
        .unwrap();

    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(body_json(response).await["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn refresh_falls_back_to_the_refresh_cookie() {
    let backend = Arc::new(FakeBackend::default());
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header(header::COOKIE, format!("wk-refresh-token={}", REFRESH_TOKEN))
        .body(Body::empty())
        .unwrap();

    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        *backend.refreshed_with.lock().unwrap(),
        vec![REFRESH_TOKEN.to_string()]
    );
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("wk-access-token=access-2")));
    assert!(cookies.iter().any(|c| c.starts_with("wk-refresh-token=refresh-2")));
}

#[tokio::test]
async fn refresh_without_any_token_is_rejected() {
    let backend = Arc::new(FakeBackend::default());
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .body(Body::empty())
        .unwrap();

    let response = app(backend.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    assert!(backend.refreshed_with.lock().unwrap().is_empty());
}

#[tokio::test]
async fn session_close_to_expiry_is_due_for_refresh() {
    let user_id = Uuid::new_v4();
    let soon = token_expiring_at(user_id, Utc::now().timestamp() + 120);

    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(
            get("/api/auth/session")
                .header(header::AUTHORIZATION, format!("Bearer {}", soon))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "refresh_due");
    assert_eq!(body["refresh_in"], 0);
    assert_eq!(body["poll_interval"], 60);
    assert!(body["expires_in"].as_i64().is_some_and(|s| s > 0 && s <= 120));
}

// =============================================================================
// Locale routing
// =============================================================================

#[tokio::test]
async fn page_redirect_prefers_locale_cookie() {
    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(
            get("/stores?tab=hours")
                .header(header::COOKIE, "wk-locale=ja")
                .header(header::ACCEPT_LANGUAGE, "en")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        header_value(&response, header::LOCATION).as_deref(),
        Some("/ja/stores?tab=hours")
    );
}

#[tokio::test]
async fn page_redirect_falls_back_to_header_then_default() {
    let app = app(Arc::new(FakeBackend::default()));

    let response = app
        .clone()
        .oneshot(
            get("/stores")
                .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        header_value(&response, header::LOCATION).as_deref(),
        Some("/en/stores")
    );

    let response = app
        .oneshot(get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(header_value(&response, header::LOCATION).as_deref(), Some("/ko"));
}

#[tokio::test]
async fn localized_page_remembers_locale() {
    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(get("/en/stores").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = header_value(&response, header::SET_COOKIE).unwrap_or_default();
    assert!(cookie.starts_with("wk-locale=en"));
    let body = body_json(response).await;
    assert_eq!(body["locale"], "en");
    assert_eq!(body["path"], "/stores");
}

#[tokio::test]
async fn unknown_api_path_is_not_found() {
    let response = app(Arc::new(FakeBackend::default()))
        .oneshot(get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn unsupported_locale_is_rejected() {
    let request = Request::builder()
        .method("PUT")
        .uri("/api/locale")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "locale": "fr" }).to_string()))
        .unwrap();

    let response = tokio_test::assert_ok!(app(Arc::new(FakeBackend::default())).oneshot(request).await);

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(header_value(&response, header::SET_COOKIE).is_none());
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn chosen_locale_is_stored_in_cookie() {
    let request = Request::builder()
        .method("PUT")
        .uri("/api/locale")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "locale": "ja" }).to_string()))
        .unwrap();

    let response = tokio_test::assert_ok!(app(Arc::new(FakeBackend::default())).oneshot(request).await);

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = header_value(&response, header::SET_COOKIE).unwrap_or_default();
    assert!(cookie.starts_with("wk-locale=ja"));
    assert_eq!(body_json(response).await["locale"], "ja");
}
