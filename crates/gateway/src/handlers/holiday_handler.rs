//! Holiday handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{AuditTarget, Holiday};

use crate::clients::{names::table, Query};
use crate::extractors::{Path, QueryParams, ValidatedJson};
use crate::middleware::CurrentUser;
use crate::resources::{self, Checked, StoreResource};
use crate::state::AppState;

fn default_closed() -> bool {
    true
}

/// Holiday creation request
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateHolidayRequest {
    #[schema(value_type = String, example = "2024-09-17")]
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    #[schema(example = "Chuseok")]
    pub name: String,
    /// Whether the store is closed all day
    #[serde(default = "default_closed")]
    pub is_closed: bool,
}

/// Holiday update request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateHolidayRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2024-09-18")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_closed: Option<bool>,
}

/// Holiday list filter; both bounds are inclusive
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HolidayFilter {
    #[param(value_type = Option<String>, example = "2024-01-01")]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, example = "2024-12-31")]
    pub to: Option<NaiveDate>,
}

impl HolidayFilter {
    fn to_query(&self) -> AppResult<Query> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::validation("validation.date_range"));
            }
        }

        let mut query = Query::new();
        if let Some(from) = self.from {
            query = query.gte("date", from);
        }
        if let Some(to) = self.to {
            query = query.lte("date", to);
        }
        Ok(query)
    }
}

impl Checked for CreateHolidayRequest {}
impl Checked for Holiday {}

pub struct Holidays;

impl StoreResource for Holidays {
    const TABLE: &'static str = table::HOLIDAYS;
    const TARGET: AuditTarget = AuditTarget::Holiday;
    const ORDER_BY: &'static [(&'static str, bool)] = &[("date", true)];

    type Row = Holiday;
    type Create = CreateHolidayRequest;
    type Patch = UpdateHolidayRequest;

    fn id(row: &Holiday) -> Uuid {
        row.id
    }
}

/// Create holiday routes nested under a store
pub fn holiday_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/holidays", get(list_holidays).post(create_holiday))
        .route(
            "/:id/holidays/:item_id",
            patch(update_holiday).delete(delete_holiday),
        )
}

/// List holidays, optionally within a date range
#[utoipa::path(
    get,
    path = "/api/stores/{id}/holidays",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID"), HolidayFilter),
    responses(
        (status = 200, description = "Holidays by date", body = Vec<Holiday>),
        (status = 400, description = "`from` is after `to`"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_holidays(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    QueryParams(filter): QueryParams<HolidayFilter>,
) -> AppResult<Json<Vec<Holiday>>> {
    let query = filter.to_query()?;
    resources::list::<Holidays>(&state, &current_user, store_id, query)
        .await
        .map(Json)
}

/// Create a holiday
#[utoipa::path(
    post,
    path = "/api/stores/{id}/holidays",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = CreateHolidayRequest,
    responses(
        (status = 201, description = "Holiday created", body = Holiday),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_holiday(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateHolidayRequest>,
) -> AppResult<(StatusCode, Json<Holiday>)> {
    let row = resources::create::<Holidays>(&state, &current_user, store_id, payload).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Update a holiday
#[utoipa::path(
    patch,
    path = "/api/stores/{id}/holidays/{item_id}",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("item_id" = Uuid, Path, description = "Holiday ID")
    ),
    request_body = UpdateHolidayRequest,
    responses(
        (status = 200, description = "Holiday updated", body = Holiday),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found in this store")
    )
)]
pub async fn update_holiday(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<UpdateHolidayRequest>,
) -> AppResult<Json<Holiday>> {
    resources::update::<Holidays>(&state, &current_user, store_id, id, payload)
        .await
        .map(Json)
}

/// Delete a holiday
#[utoipa::path(
    delete,
    path = "/api/stores/{id}/holidays/{item_id}",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("item_id" = Uuid, Path, description = "Holiday ID")
    ),
    responses(
        (status = 204, description = "Holiday deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found in this store")
    )
)]
pub async fn delete_holiday(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    resources::delete::<Holidays>(&state, &current_user, store_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
