//! Generic CRUD for store-scoped schedule settings.
//!
//! Every query carries the `store_id` filter from the path, so a row id from
//! another store never matches even when row-level security would allow it.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{AuditAction, AuditEvent, AuditTarget, DomainResult, Permission};

use crate::audit;
use crate::clients::Query;
use crate::middleware::{require_permission, CurrentUser};
use crate::state::AppState;

/// Cross-field rules a payload or a resulting row must satisfy.
pub trait Checked {
    fn check(&self) -> DomainResult<()> {
        Ok(())
    }
}

/// A table whose rows belong to one store.
pub trait StoreResource {
    const TABLE: &'static str;
    const TARGET: AuditTarget;
    /// `(column, ascending)` pairs for list ordering
    const ORDER_BY: &'static [(&'static str, bool)];

    type Row: Serialize + DeserializeOwned + Checked + Send;
    type Create: Serialize + Checked + Send + Sync;
    /// Partial update; `None` fields must be skipped when serialized
    type Patch: Serialize + Send + Sync;

    fn id(row: &Self::Row) -> Uuid;
}

fn scoped(store_id: Uuid, id: Uuid) -> Query {
    Query::new().eq("id", id).eq("store_id", store_id)
}

/// Serialize a create payload and stamp it with the owning store.
pub(crate) fn with_store<B: Serialize>(payload: &B, store_id: Uuid) -> AppResult<Value> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(mut fields)) => {
            fields.insert("store_id".to_string(), Value::String(store_id.to_string()));
            Ok(Value::Object(fields))
        }
        Ok(_) => Err(AppError::internal("Create payload must be an object")),
        Err(e) => Err(AppError::internal(format!("Serialization error: {}", e))),
    }
}

/// Non-empty patch object.
pub(crate) fn patch_fields<P: Serialize>(patch: &P) -> AppResult<Map<String, Value>> {
    match serde_json::to_value(patch) {
        Ok(Value::Object(fields)) if !fields.is_empty() => Ok(fields),
        Ok(_) => Err(AppError::validation("validation.empty_update")),
        Err(e) => Err(AppError::internal(format!("Serialization error: {}", e))),
    }
}

/// Overlay `patch` on `row` and decode the result.
pub(crate) fn merged<T: Serialize + DeserializeOwned>(
    row: &T,
    patch: &Map<String, Value>,
) -> AppResult<T> {
    let mut value = serde_json::to_value(row)
        .map_err(|e| AppError::internal(format!("Serialization error: {}", e)))?;
    if let Value::Object(fields) = &mut value {
        for (key, v) in patch {
            fields.insert(key.clone(), v.clone());
        }
    }
    serde_json::from_value(value).map_err(|_| AppError::validation("error.validation"))
}

/// List rows of the store, optionally narrowed by `filter`.
pub async fn list<R: StoreResource>(
    state: &AppState,
    current_user: &CurrentUser,
    store_id: Uuid,
    filter: Query,
) -> AppResult<Vec<R::Row>> {
    require_permission(state, current_user, store_id, Permission::ViewStore).await?;

    let query = R::ORDER_BY
        .iter()
        .fold(filter.eq("store_id", store_id), |q, (column, asc)| {
            q.order(column, *asc)
        });

    state
        .baas
        .select(&current_user.caller(), R::TABLE, &query)
        .await
}

pub async fn create<R: StoreResource>(
    state: &AppState,
    current_user: &CurrentUser,
    store_id: Uuid,
    payload: R::Create,
) -> AppResult<R::Row> {
    require_permission(state, current_user, store_id, Permission::ManageSchedule).await?;
    payload.check()?;

    let body = with_store(&payload, store_id)?;
    let row: R::Row = state
        .baas
        .insert(&current_user.caller(), R::TABLE, &body)
        .await?;

    let event = AuditEvent::new(store_id, AuditAction::Create, R::TARGET)
        .target(R::id(&row))
        .details(body);
    audit::record(state, current_user, event).await;

    Ok(row)
}

/// Apply a partial update. The existing row is merged with the patch and
/// re-checked so cross-field rules hold for the stored result.
pub async fn update<R: StoreResource>(
    state: &AppState,
    current_user: &CurrentUser,
    store_id: Uuid,
    id: Uuid,
    patch: R::Patch,
) -> AppResult<R::Row> {
    require_permission(state, current_user, store_id, Permission::ManageSchedule).await?;
    let fields = patch_fields(&patch)?;

    let caller = current_user.caller();
    let existing: R::Row = state
        .baas
        .select_one(&caller, R::TABLE, scoped(store_id, id))
        .await?
        .ok_or_not_found()?;
    merged(&existing, &fields)?.check()?;

    let row: R::Row = state
        .baas
        .update(&caller, R::TABLE, &scoped(store_id, id), &fields)
        .await?;

    let event = AuditEvent::new(store_id, AuditAction::Update, R::TARGET)
        .target(id)
        .details(Value::Object(fields));
    audit::record(state, current_user, event).await;

    Ok(row)
}

pub async fn delete<R: StoreResource>(
    state: &AppState,
    current_user: &CurrentUser,
    store_id: Uuid,
    id: Uuid,
) -> AppResult<()> {
    require_permission(state, current_user, store_id, Permission::ManageSchedule).await?;

    state
        .baas
        .delete(&current_user.caller(), R::TABLE, &scoped(store_id, id))
        .await?;

    audit::record(
        state,
        current_user,
        AuditEvent::new(store_id, AuditAction::Delete, R::TARGET).target(id),
    )
    .await;

    Ok(())
}
