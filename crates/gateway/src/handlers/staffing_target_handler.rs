//! Staffing target handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{
    schedule::{check_staff_range, check_time_range, check_weekday},
    time_format, AuditTarget, DomainResult, StaffingTarget,
};

use crate::clients::{names::table, Query};
use crate::extractors::{Path, ValidatedJson};
use crate::middleware::CurrentUser;
use crate::resources::{self, Checked, StoreResource};
use crate::state::AppState;

/// Staffing target creation request
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateStaffingTargetRequest {
    /// Restrict the target to one work item
    pub work_item_id: Option<Uuid>,
    /// 0 = Sunday .. 6 = Saturday
    #[validate(range(min = 0, max = 6, message = "validation.weekday_range"))]
    pub weekday: u8,
    #[serde(deserialize_with = "time_format::deserialize")]
    #[schema(value_type = String, example = "11:00")]
    pub start_time: NaiveTime,
    #[serde(deserialize_with = "time_format::deserialize")]
    #[schema(value_type = String, example = "14:00")]
    pub end_time: NaiveTime,
    #[validate(range(min = 0, message = "validation.staff_range"))]
    pub min_staff: i32,
    #[validate(range(min = 0, message = "validation.staff_range"))]
    pub max_staff: Option<i32>,
}

/// Staffing target update request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateStaffingTargetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_item_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 6, message = "validation.weekday_range"))]
    pub weekday: Option<u8>,
    #[serde(
        default,
        deserialize_with = "time_format::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "11:00")]
    pub start_time: Option<NaiveTime>,
    #[serde(
        default,
        deserialize_with = "time_format::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "14:00")]
    pub end_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "validation.staff_range"))]
    pub min_staff: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "validation.staff_range"))]
    pub max_staff: Option<i32>,
}

impl Checked for CreateStaffingTargetRequest {
    fn check(&self) -> DomainResult<()> {
        check_time_range(self.start_time, self.end_time)?;
        check_staff_range(self.min_staff, self.max_staff)
    }
}

impl Checked for StaffingTarget {
    fn check(&self) -> DomainResult<()> {
        check_weekday(self.weekday)?;
        check_time_range(self.start_time, self.end_time)?;
        check_staff_range(self.min_staff, self.max_staff)
    }
}

pub struct StaffingTargets;

impl StoreResource for StaffingTargets {
    const TABLE: &'static str = table::STAFFING_TARGETS;
    const TARGET: AuditTarget = AuditTarget::StaffingTarget;
    const ORDER_BY: &'static [(&'static str, bool)] = &[("weekday", true), ("start_time", true)];

    type Row = StaffingTarget;
    type Create = CreateStaffingTargetRequest;
    type Patch = UpdateStaffingTargetRequest;

    fn id(row: &StaffingTarget) -> Uuid {
        row.id
    }
}

/// Create staffing target routes nested under a store
pub fn staffing_target_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:id/staffing-targets",
            get(list_staffing_targets).post(create_staffing_target),
        )
        .route(
            "/:id/staffing-targets/:item_id",
            patch(update_staffing_target).delete(delete_staffing_target),
        )
}

/// List staffing targets
#[utoipa::path(
    get,
    path = "/api/stores/{id}/staffing-targets",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Staffing targets by weekday and start", body = Vec<StaffingTarget>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_staffing_targets(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<StaffingTarget>>> {
    resources::list::<StaffingTargets>(&state, &current_user, store_id, Query::new())
        .await
        .map(Json)
}

/// Create a staffing target
#[utoipa::path(
    post,
    path = "/api/stores/{id}/staffing-targets",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = CreateStaffingTargetRequest,
    responses(
        (status = 201, description = "Staffing target created", body = StaffingTarget),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_staffing_target(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateStaffingTargetRequest>,
) -> AppResult<(StatusCode, Json<StaffingTarget>)> {
    let row =
        resources::create::<StaffingTargets>(&state, &current_user, store_id, payload).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Update a staffing target
#[utoipa::path(
    patch,
    path = "/api/stores/{id}/staffing-targets/{item_id}",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("item_id" = Uuid, Path, description = "Staffing target ID")
    ),
    request_body = UpdateStaffingTargetRequest,
    responses(
        (status = 200, description = "Staffing target updated", body = StaffingTarget),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found in this store")
    )
)]
pub async fn update_staffing_target(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<UpdateStaffingTargetRequest>,
) -> AppResult<Json<StaffingTarget>> {
    resources::update::<StaffingTargets>(&state, &current_user, store_id, id, payload)
        .await
        .map(Json)
}

/// Delete a staffing target
#[utoipa::path(
    delete,
    path = "/api/stores/{id}/staffing-targets/{item_id}",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("item_id" = Uuid, Path, description = "Staffing target ID")
    ),
    responses(
        (status = 204, description = "Staffing target deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found in this store")
    )
)]
pub async fn delete_staffing_target(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    resources::delete::<StaffingTargets>(&state, &current_user, store_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
