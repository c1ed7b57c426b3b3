//! Typed facade over a [`Backend`].

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use common::{AppError, AppResult};
use domain::{AuthSession, AuthUser, UserMetadata};

use super::{Backend, Caller, Query};

/// BaaS client shared by all handlers.
#[derive(Clone)]
pub struct BaasClient {
    backend: Arc<dyn Backend>,
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> AppResult<Value> {
    serde_json::to_value(body)
        .map_err(|e| AppError::internal(format!("Serialization error: {}", e)))
}

fn from_json<T: DeserializeOwned>(value: Value) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::internal(format!("Unexpected BaaS payload: {}", e)))
}

impl BaasClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Read rows.
    pub async fn select<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        table: &str,
        query: &Query,
    ) -> AppResult<Vec<T>> {
        self.backend
            .select(caller, table, query)
            .await?
            .into_iter()
            .map(from_json)
            .collect()
    }

    /// Read the first matching row.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        table: &str,
        query: Query,
    ) -> AppResult<Option<T>> {
        let query = query.limit(1);
        let rows = self.backend.select(caller, table, &query).await?;
        rows.into_iter().next().map(from_json).transpose()
    }

    /// Insert one row and return it as stored.
    pub async fn insert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        caller: &Caller,
        table: &str,
        body: &B,
    ) -> AppResult<T> {
        let rows = self.backend.insert(caller, table, to_json(body)?).await?;
        rows.into_iter()
            .next()
            .map(from_json)
            .unwrap_or_else(|| Err(AppError::internal(format!("Insert into {} returned no row", table))))
    }

    /// Patch matching rows and return the first; no match is `NotFound`.
    pub async fn update<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        caller: &Caller,
        table: &str,
        query: &Query,
        patch: &B,
    ) -> AppResult<T> {
        let rows = self
            .backend
            .update(caller, table, query, to_json(patch)?)
            .await?;
        rows.into_iter()
            .next()
            .map(from_json)
            .unwrap_or(Err(AppError::NotFound))
    }

    /// Insert or merge rows on `on_conflict`.
    pub async fn upsert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        caller: &Caller,
        table: &str,
        rows: &B,
        on_conflict: &str,
    ) -> AppResult<Vec<T>> {
        self.backend
            .upsert(caller, table, to_json(rows)?, on_conflict)
            .await?
            .into_iter()
            .map(from_json)
            .collect()
    }

    /// Delete matching rows; no match is `NotFound`.
    pub async fn delete(&self, caller: &Caller, table: &str, query: &Query) -> AppResult<()> {
        let deleted = self.backend.delete(caller, table, query).await?;
        if deleted.is_empty() {
            Err(AppError::NotFound)
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Database functions
    // =========================================================================

    /// Call a function and decode its raw result.
    pub async fn rpc<T: DeserializeOwned, A: Serialize + ?Sized>(
        &self,
        caller: &Caller,
        function: &str,
        args: &A,
    ) -> AppResult<T> {
        let value = self.backend.rpc(caller, function, to_json(args)?).await?;
        from_json(value)
    }

    /// Call a function returning a single row. Set-returning functions
    /// yield an array; its first element is used. `null` / `[]` is `None`.
    pub async fn rpc_row<T: DeserializeOwned, A: Serialize + ?Sized>(
        &self,
        caller: &Caller,
        function: &str,
        args: &A,
    ) -> AppResult<Option<T>> {
        let value = self.backend.rpc(caller, function, to_json(args)?).await?;
        let row = match value {
            Value::Array(rows) => rows.into_iter().next(),
            Value::Null => None,
            other => Some(other),
        };
        row.map(from_json).transpose()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        self.backend.sign_in_with_password(email, password).await
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> AppResult<AuthUser> {
        self.backend.sign_up(email, password, metadata).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthSession> {
        self.backend.refresh_session(refresh_token).await
    }

    pub async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        self.backend.sign_out(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockBackend;
    use domain::{Store, StoreRole};
    use mockall::predicate::eq;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use uuid::Uuid;

    fn store_json(id: Uuid) -> Value {
        json!({
            "id": id,
            "name": "Cafe",
            "timezone": "Asia/Seoul",
            "owner_id": Uuid::new_v4(),
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn select_one_limits_and_decodes() {
        let id = Uuid::new_v4();
        let mut backend = MockBackend::new();
        backend
            .expect_select()
            .withf(|_, table, query| table == "stores" && query.to_pairs().contains(&("limit".into(), "1".into())))
            .times(1)
            .returning(move |_, _, _| Ok(vec![store_json(id)]));

        let client = BaasClient::new(Arc::new(backend));
        let store: Option<Store> = assert_ok!(
            client
                .select_one(&Caller::Anonymous, "stores", Query::new().eq("id", id))
                .await
        );
        assert_eq!(store.map(|s| s.id), Some(id));
    }

    #[tokio::test]
    async fn update_without_rows_is_not_found() {
        let mut backend = MockBackend::new();
        backend.expect_update().returning(|_, _, _, _| Ok(vec![]));

        let client = BaasClient::new(Arc::new(backend));
        let result: AppResult<Store> = client
            .update(&Caller::user("t"), "stores", &Query::new().eq("id", 1), &json!({"name": "x"}))
            .await;
        assert!(matches!(assert_err!(result), AppError::NotFound));
    }

    #[tokio::test]
    async fn rpc_row_unwraps_set_results() {
        let mut backend = MockBackend::new();
        backend
            .expect_rpc()
            .with(eq(Caller::user("t")), eq("grant_user_role"), mockall::predicate::always())
            .returning(|_, _, _| Ok(json!([{ "role": "SUB_MANAGER" }])));

        let client = BaasClient::new(Arc::new(backend));
        let row: Option<Value> = assert_ok!(
            client
                .rpc_row(&Caller::user("t"), "grant_user_role", &json!({}))
                .await
        );
        let role: StoreRole = serde_json::from_value(row.unwrap()["role"].clone()).unwrap();
        assert_eq!(role, StoreRole::SubManager);
    }

    #[tokio::test]
    async fn rpc_row_null_is_none() {
        let mut backend = MockBackend::new();
        backend.expect_rpc().returning(|_, _, _| Ok(Value::Null));

        let client = BaasClient::new(Arc::new(backend));
        let row: Option<Value> = assert_ok!(
            client.rpc_row(&Caller::Anonymous, "get_invitation", &json!({})).await
        );
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn payload_mismatch_is_internal() {
        let mut backend = MockBackend::new();
        backend
            .expect_select()
            .returning(|_, _, _| Ok(vec![json!({ "unexpected": true })]));

        let client = BaasClient::new(Arc::new(backend));
        let result: AppResult<Vec<Store>> = client
            .select(&Caller::Anonymous, "stores", &Query::new())
            .await;
        assert!(matches!(assert_err!(result), AppError::Internal(_)));
    }
}
