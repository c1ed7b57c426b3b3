//! Business hour handlers.
//!
//! A store keeps at most one row per weekday, so the week is replaced in a
//! single upsert rather than edited row by row.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{
    schedule::{check_business_hour, check_unique_weekdays},
    time_format, AuditAction, AuditEvent, AuditTarget, BusinessHour, DomainResult, Permission,
};

use crate::audit;
use crate::clients::{names::table, Query};
use crate::extractors::{Path, ValidatedJson};
use crate::middleware::{require_permission, CurrentUser};
use crate::resources::with_store;
use crate::state::AppState;

/// Hours for one weekday
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct BusinessHourInput {
    /// 0 = Sunday .. 6 = Saturday
    #[validate(range(min = 0, max = 6, message = "validation.weekday_range"))]
    pub weekday: u8,
    #[serde(default, deserialize_with = "time_format::option::deserialize")]
    #[schema(value_type = Option<String>, example = "09:00")]
    pub open_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "time_format::option::deserialize")]
    #[schema(value_type = Option<String>, example = "22:00")]
    pub close_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_closed: bool,
}

/// Weekly business hours replacement
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReplaceBusinessHoursRequest {
    #[validate(length(min = 1, max = 7, message = "validation.weekday_range"))]
    pub hours: Vec<BusinessHourInput>,
}

impl ReplaceBusinessHoursRequest {
    fn check(&self) -> DomainResult<()> {
        check_unique_weekdays(self.hours.iter().map(|h| h.weekday))?;
        self.hours
            .iter()
            .try_for_each(|h| check_business_hour(h.is_closed, h.open_time, h.close_time))
    }
}

/// Create business hour routes nested under a store
pub fn business_hour_routes() -> Router<AppState> {
    Router::new().route(
        "/:id/business-hours",
        get(list_business_hours).put(replace_business_hours),
    )
}

/// List business hours
#[utoipa::path(
    get,
    path = "/api/stores/{id}/business-hours",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Business hours by weekday", body = Vec<BusinessHour>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_business_hours(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<BusinessHour>>> {
    require_permission(&state, &current_user, store_id, Permission::ViewStore).await?;

    let hours = state
        .baas
        .select(
            &current_user.caller(),
            table::BUSINESS_HOURS,
            &Query::new()
                .eq("store_id", store_id)
                .order("weekday", true),
        )
        .await?;

    Ok(Json(hours))
}

/// Replace the weekdays given in the request
#[utoipa::path(
    put,
    path = "/api/stores/{id}/business-hours",
    tag = "Schedule settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = ReplaceBusinessHoursRequest,
    responses(
        (status = 200, description = "Stored hours for the given weekdays", body = Vec<BusinessHour>),
        (status = 400, description = "Duplicate weekday or inconsistent hours"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn replace_business_hours(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReplaceBusinessHoursRequest>,
) -> AppResult<Json<Vec<BusinessHour>>> {
    require_permission(&state, &current_user, store_id, Permission::ManageSchedule).await?;
    payload.check()?;

    let rows = payload
        .hours
        .iter()
        .map(|h| with_store(h, store_id))
        .collect::<AppResult<Vec<Value>>>()?;

    let mut hours: Vec<BusinessHour> = state
        .baas
        .upsert(
            &current_user.caller(),
            table::BUSINESS_HOURS,
            &rows,
            "store_id,weekday",
        )
        .await?;
    hours.sort_by_key(|h| h.weekday);

    info!(store_id = %store_id, days = hours.len(), "Business hours replaced");

    let event = AuditEvent::new(store_id, AuditAction::Replace, AuditTarget::BusinessHours)
        .details(json!({ "hours": rows }));
    audit::record(&state, &current_user, event).await;

    Ok(Json(hours))
}
