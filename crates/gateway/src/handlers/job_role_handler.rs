//! Job role handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{AuditTarget, JobRole};

use crate::clients::{names::table, Query};
use crate::extractors::{Path, ValidatedJson};
use crate::middleware::CurrentUser;
use crate::resources::{self, Checked, StoreResource};
use crate::state::AppState;

fn default_active() -> bool {
    true
}

/// Job role creation request
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateJobRoleRequest {
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    #[schema(example = "Barista")]
    pub name: String,
    #[validate(length(max = 500, message = "validation.description_length"))]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Job role update request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateJobRoleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "validation.description_length"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Checked for CreateJobRoleRequest {}
impl Checked for JobRole {}

pub struct JobRoles;

impl StoreResource for JobRoles {
    const TABLE: &'static str = table::JOB_ROLES;
    const TARGET: AuditTarget = AuditTarget::JobRole;
    const ORDER_BY: &'static [(&'static str, bool)] = &[("name", true)];

    type Row = JobRole;
    type Create = CreateJobRoleRequest;
    type Patch = UpdateJobRoleRequest;

    fn id(row: &JobRole) -> Uuid {
        row.id
    }
}

/// Create job role routes nested under a store
pub fn job_role_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/job-roles", get(list_job_roles).post(create_job_role))
        .route(
            "/:id/job-roles/:item_id",
            patch(update_job_role).delete(delete_job_role),
        )
}

/// List job roles
#[utoipa::path(
    get,
    path = "/api/stores/{id}/job-roles",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Job roles by name", body = Vec<JobRole>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_job_roles(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<JobRole>>> {
    resources::list::<JobRoles>(&state, &current_user, store_id, Query::new())
        .await
        .map(Json)
}

/// Create a job role
#[utoipa::path(
    post,
    path = "/api/stores/{id}/job-roles",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = CreateJobRoleRequest,
    responses(
        (status = 201, description = "Job role created", body = JobRole),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_job_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateJobRoleRequest>,
) -> AppResult<(StatusCode, Json<JobRole>)> {
    let row = resources::create::<JobRoles>(&state, &current_user, store_id, payload).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Update a job role
#[utoipa::path(
    patch,
    path = "/api/stores/{id}/job-roles/{item_id}",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("item_id" = Uuid, Path, description = "Job role ID")
    ),
    request_body = UpdateJobRoleRequest,
    responses(
        (status = 200, description = "Job role updated", body = JobRole),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found in this store")
    )
)]
pub async fn update_job_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<UpdateJobRoleRequest>,
) -> AppResult<Json<JobRole>> {
    resources::update::<JobRoles>(&state, &current_user, store_id, id, payload)
        .await
        .map(Json)
}

/// Delete a job role
#[utoipa::path(
    delete,
    path = "/api/stores/{id}/job-roles/{item_id}",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("item_id" = Uuid, Path, description = "Job role ID")
    ),
    responses(
        (status = 204, description = "Job role deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found in this store")
    )
)]
pub async fn delete_job_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    resources::delete::<JobRoles>(&state, &current_user, store_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
