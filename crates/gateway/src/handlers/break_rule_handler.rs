//! Break rule handlers.

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
use domain::{schedule::check_break_rule, AuditTarget, BreakRule, DomainResult};

use crate::clients::{names::table, Query};
use crate::extractors::{Path, ValidatedJson};
use crate::middleware::CurrentUser;
use crate::resources::{self, Checked, StoreResource};
use crate::state::AppState;

/// Break rule creation request
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateBreakRuleRequest {
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    #[schema(example = "Lunch break")]
    pub name: String,
    /// Work time that earns the break
    #[validate(range(min = 1, max = 1440, message = "validation.work_minutes_range"))]
    #[schema(example = 240)]
    pub min_work_minutes: i32,
    #[validate(range(min = 1, max = 240, message = "validation.break_minutes_range"))]
    #[schema(example = 30)]
    pub break_minutes: i32,
    #[serde(default)]
    pub is_paid: bool,
}

/// Break rule update request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateBreakRuleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 1440, message = "validation.work_minutes_range"))]
    pub min_work_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 240, message = "validation.break_minutes_range"))]
    pub break_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
}

impl Checked for CreateBreakRuleRequest {
    fn check(&self) -> DomainResult<()> {
        check_break_rule(self.min_work_minutes, self.break_minutes)
    }
}

impl Checked for BreakRule {
    fn check(&self) -> DomainResult<()> {
        check_break_rule(self.min_work_minutes, self.break_minutes)
    }
}

pub struct BreakRules;

impl StoreResource for BreakRules {
    const TABLE: &'static str = table::BREAK_RULES;
    const TARGET: AuditTarget = AuditTarget::BreakRule;
    const ORDER_BY: &'static [(&'static str, bool)] = &[("min_work_minutes", true)];

    type Row = BreakRule;
    type Create = CreateBreakRuleRequest;
    type Patch = UpdateBreakRuleRequest;

    fn id(row: &BreakRule) -> Uuid {
        row.id
    }
}

/// Create break rule routes nested under a store
pub fn break_rule_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/break-rules", get(list_break_rules).post(create_break_rule))
        .route(
            "/:id/break-rules/:item_id",
            patch(update_break_rule).delete(delete_break_rule),
        )
}

/// List break rules
#[utoipa::path(
    get,
    path = "/api/stores/{id}/break-rules",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Break rules", body = Vec<BreakRule>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_break_rules(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<BreakRule>>> {
    resources::list::<BreakRules>(&state, &current_user, store_id, Query::new())
        .await
        .map(Json)
}

/// Create a break rule
#[utoipa::path(
    post,
    path = "/api/stores/{id}/break-rules",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = CreateBreakRuleRequest,
    responses(
        (status = 201, description = "Break rule created", body = BreakRule),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_break_rule(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateBreakRuleRequest>,
) -> AppResult<(StatusCode, Json<BreakRule>)> {
    let row = resources::create::<BreakRules>(&state, &current_user, store_id, payload).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Update a break rule
#[utoipa::path(
    patch,
    path = "/api/stores/{id}/break-rules/{item_id}",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("item_id" = Uuid, Path, description = "Break rule ID")
    ),
    request_body = UpdateBreakRuleRequest,
    responses(
        (status = 200, description = "Break rule updated", body = BreakRule),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found in this store")
    )
)]
pub async fn update_break_rule(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<UpdateBreakRuleRequest>,
) -> AppResult<Json<BreakRule>> {
    resources::update::<BreakRules>(&state, &current_user, store_id, id, payload)
        .await
        .map(Json)
}

/// Delete a break rule
#[utoipa::path(
    delete,
    path = "/api/stores/{id}/break-rules/{item_id}",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("item_id" = Uuid, Path, description = "Break rule ID")
    ),
    responses(
        (status = 204, description = "Break rule deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found in this store")
    )
)]
pub async fn delete_break_rule(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    resources::delete::<BreakRules>(&state, &current_user, store_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
