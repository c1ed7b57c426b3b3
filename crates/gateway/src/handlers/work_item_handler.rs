//! Work item handlers.

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
use domain::{schedule::check_color, AuditTarget, DomainResult, WorkItem};

use crate::clients::{names::table, Query};
use crate::extractors::{Path, ValidatedJson};
use crate::middleware::CurrentUser;
use crate::resources::{self, Checked, StoreResource};
use crate::state::AppState;

fn default_active() -> bool {
    true
}

/// Work item creation request
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateWorkItemRequest {
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    #[schema(example = "Register")]
    pub name: String,
    #[validate(length(max = 500, message = "validation.description_length"))]
    pub description: Option<String>,
    /// `#RRGGBB`
    #[schema(example = "#4F46E5")]
    pub color: String,
    pub job_role_id: Option<Uuid>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Work item update request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateWorkItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "validation.description_length"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_role_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Checked for CreateWorkItemRequest {
    fn check(&self) -> DomainResult<()> {
        check_color(&self.color)
    }
}

impl Checked for WorkItem {
    fn check(&self) -> DomainResult<()> {
        check_color(&self.color)
    }
}

pub struct WorkItems;

impl StoreResource for WorkItems {
    const TABLE: &'static str = table::WORK_ITEMS;
    const TARGET: AuditTarget = AuditTarget::WorkItem;
    const ORDER_BY: &'static [(&'static str, bool)] = &[("name", true)];

    type Row = WorkItem;
    type Create = CreateWorkItemRequest;
    type Patch = UpdateWorkItemRequest;

    fn id(row: &WorkItem) -> Uuid {
        row.id
    }
}

/// Create work item routes nested under a store
pub fn work_item_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/work-items", get(list_work_items).post(create_work_item))
        .route(
            "/:id/work-items/:item_id",
            patch(update_work_item).delete(delete_work_item),
        )
}

/// List work items
#[utoipa::path(
    get,
    path = "/api/stores/{id}/work-items",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Work items by name", body = Vec<WorkItem>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_work_items(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<WorkItem>>> {
    resources::list::<WorkItems>(&state, &current_user, store_id, Query::new())
        .await
        .map(Json)
}

/// Create a work item
#[utoipa::path(
    post,
    path = "/api/stores/{id}/work-items",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = CreateWorkItemRequest,
    responses(
        (status = 201, description = "Work item created", body = WorkItem),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_work_item(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateWorkItemRequest>,
) -> AppResult<(StatusCode, Json<WorkItem>)> {
    let row = resources::create::<WorkItems>(&state, &current_user, store_id, payload).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Update a work item
#[utoipa::path(
    patch,
    path = "/api/stores/{id}/work-items/{item_id}",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("item_id" = Uuid, Path, description = "Work item ID")
    ),
    request_body = UpdateWorkItemRequest,
    responses(
        (status = 200, description = "Work item updated", body = WorkItem),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found in this store")
    )
)]
pub async fn update_work_item(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<UpdateWorkItemRequest>,
) -> AppResult<Json<WorkItem>> {
    resources::update::<WorkItems>(&state, &current_user, store_id, id, payload)
        .await
        .map(Json)
}

/// Delete a work item
#[utoipa::path(
    delete,
    path = "/api/stores/{id}/work-items/{item_id}",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("item_id" = Uuid, Path, description = "Work item ID")
    ),
    responses(
        (status = 204, description = "Work item deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found in this store")
    )
)]
pub async fn delete_work_item(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    resources::delete::<WorkItems>(&state, &current_user, store_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use domain::DomainError;

    #[test]
    fn short_color_is_rejected_on_create() {
        let req: CreateWorkItemRequest =
            serde_json::from_value(json!({ "name": "Kitchen", "color": "#fff" })).unwrap();
        assert_eq!(
            req.check(),
            Err(DomainError::validation("validation.color_format"))
        );
    }

    #[test]
    fn new_items_default_to_active() {
        let req: CreateWorkItemRequest =
            serde_json::from_value(json!({ "name": "Kitchen", "color": "#112233" })).unwrap();
        assert!(req.is_active);
        assert!(req.check().is_ok());
    }
}
