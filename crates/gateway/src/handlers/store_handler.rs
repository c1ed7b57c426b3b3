//! Store handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult, OptionExt};
use domain::{
    AuditAction, AuditEvent, AuditTarget, BreakRule, BusinessHour, Holiday, JobRole, Membership,
    Permission, StaffingTarget, Store, WorkItem, DEFAULT_TIMEZONE,
};

use crate::audit;
use crate::clients::{
    names::{function, table},
    Query,
};
use crate::extractors::{Path, ValidatedJson};
use crate::middleware::{require_permission, CurrentUser};
use crate::resources::patch_fields;
use crate::state::AppState;

/// Store creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStoreRequest {
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    #[schema(example = "Workeasy Cafe Gangnam")]
    pub name: String,
    #[validate(length(max = 500, message = "validation.description_length"))]
    pub description: Option<String>,
    #[validate(length(max = 200, message = "validation.text_length"))]
    pub address: Option<String>,
    #[validate(length(max = 30, message = "validation.text_length"))]
    pub phone: Option<String>,
    /// IANA timezone; defaults to Asia/Seoul
    #[validate(length(min = 1, max = 64, message = "validation.text_length"))]
    pub timezone: Option<String>,
}

/// Store update request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateStoreRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "validation.description_length"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "validation.text_length"))]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "validation.text_length"))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64, message = "validation.text_length"))]
    pub timezone: Option<String>,
}

/// Everything the schedule editor needs for one store
#[derive(Debug, Serialize, ToSchema)]
pub struct StoreSettings {
    pub business_hours: Vec<BusinessHour>,
    pub holidays: Vec<Holiday>,
    pub break_rules: Vec<BreakRule>,
    pub work_items: Vec<WorkItem>,
    pub staffing_targets: Vec<StaffingTarget>,
    pub job_roles: Vec<JobRole>,
}

/// Create store routes
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route(
            "/:id",
            get(get_store).patch(update_store).delete(delete_store),
        )
        .route("/:id/settings", get(get_settings))
}

fn by_id(id: Uuid) -> Query {
    Query::new().eq("id", id)
}

/// List stores the caller is an active member of
#[utoipa::path(
    get,
    path = "/api/stores",
    tag = "Stores",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stores of the caller", body = Vec<Store>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_stores(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Store>>> {
    let caller = current_user.caller();
    let memberships: Vec<Membership> = state
        .baas
        .select(
            &caller,
            table::USER_STORE_ROLES,
            &Query::new()
                .eq("user_id", current_user.id)
                .eq("is_active", true),
        )
        .await?;

    if memberships.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let stores = state
        .baas
        .select(
            &caller,
            table::STORES,
            &Query::new()
                .is_in("id", memberships.iter().map(|m| m.store_id))
                .order("name", true),
        )
        .await?;

    Ok(Json(stores))
}

/// Create a store; the caller becomes its MASTER
#[utoipa::path(
    post,
    path = "/api/stores",
    tag = "Stores",
    security(("bearer_auth" = [])),
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created", body = Store),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_store(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateStoreRequest>,
) -> AppResult<(StatusCode, Json<Store>)> {
    let args = json!({
        "p_name": payload.name.trim(),
        "p_description": payload.description,
        "p_address": payload.address,
        "p_phone": payload.phone,
        "p_timezone": payload.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE),
    });

    let store: Store = state
        .baas
        .rpc_row(&current_user.caller(), function::CREATE_STORE, &args)
        .await?
        .ok_or_else(|| AppError::internal("create_store returned no row"))?;

    info!(store_id = %store.id, owner_id = %current_user.id, "Store created");

    let event = AuditEvent::new(store.id, AuditAction::Create, AuditTarget::Store)
        .target(store.id)
        .details(json!({ "name": store.name }));
    audit::record(&state, &current_user, event).await;

    Ok((StatusCode::CREATED, Json(store)))
}

/// Get a store
#[utoipa::path(
    get,
    path = "/api/stores/{id}",
    tag = "Stores",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store", body = Store),
        (status = 403, description = "Not a member of the store"),
        (status = 404, description = "Store not found")
    )
)]
pub async fn get_store(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Store>> {
    require_permission(&state, &current_user, id, Permission::ViewStore).await?;

    let store = state
        .baas
        .select_one(&current_user.caller(), table::STORES, by_id(id))
        .await?
        .ok_or_not_found()?;

    Ok(Json(store))
}

/// Update store details (MASTER)
#[utoipa::path(
    patch,
    path = "/api/stores/{id}",
    tag = "Stores",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = UpdateStoreRequest,
    responses(
        (status = 200, description = "Store updated", body = Store),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Store not found")
    )
)]
pub async fn update_store(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStoreRequest>,
) -> AppResult<Json<Store>> {
    require_permission(&state, &current_user, id, Permission::ManageStore).await?;
    let fields = patch_fields(&payload)?;

    let store: Store = state
        .baas
        .update(&current_user.caller(), table::STORES, &by_id(id), &fields)
        .await?;

    let event = AuditEvent::new(id, AuditAction::Update, AuditTarget::Store)
        .target(id)
        .details(Value::Object(fields));
    audit::record(&state, &current_user, event).await;

    Ok(Json(store))
}

/// Delete a store (MASTER)
#[utoipa::path(
    delete,
    path = "/api/stores/{id}",
    tag = "Stores",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 204, description = "Store deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Store not found")
    )
)]
pub async fn delete_store(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&state, &current_user, id, Permission::DeleteStore).await?;

    // Recorded first; the store's audit rows may not outlive it
    audit::record(
        &state,
        &current_user,
        AuditEvent::new(id, AuditAction::Delete, AuditTarget::Store).target(id),
    )
    .await;

    state
        .baas
        .delete(&current_user.caller(), table::STORES, &by_id(id))
        .await?;

    info!(store_id = %id, "Store deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Get all schedule settings of a store
#[utoipa::path(
    get,
    path = "/api/stores/{id}/settings",
    tag = "Stores",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Schedule settings", body = StoreSettings),
        (status = 403, description = "Not a member of the store")
    )
)]
pub async fn get_settings(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StoreSettings>> {
    require_permission(&state, &current_user, id, Permission::ViewStore).await?;

    let caller = current_user.caller();
    let scoped = |order: &str| Query::new().eq("store_id", id).order(order, true);
    let (hours_q, holidays_q, breaks_q, items_q, targets_q, roles_q) = (
        scoped("weekday"),
        scoped("date"),
        scoped("min_work_minutes"),
        scoped("name"),
        scoped("weekday").order("start_time", true),
        scoped("name"),
    );

    let (business_hours, holidays, break_rules, work_items, staffing_targets, job_roles) = futures::try_join!(
        state.baas.select::<BusinessHour>(&caller, table::BUSINESS_HOURS, &hours_q),
        state.baas.select::<Holiday>(&caller, table::HOLIDAYS, &holidays_q),
        state.baas.select::<BreakRule>(&caller, table::BREAK_RULES, &breaks_q),
        state.baas.select::<WorkItem>(&caller, table::WORK_ITEMS, &items_q),
        state.baas.select::<StaffingTarget>(&caller, table::STAFFING_TARGETS, &targets_q),
        state.baas.select::<JobRole>(&caller, table::JOB_ROLES, &roles_q),
    )?;

    Ok(Json(StoreSettings {
        business_hours,
        holidays,
        break_rules,
        work_items,
        staffing_targets,
        job_roles,
    }))
}
