//! Audit log handlers.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use common::AppResult;
use domain::{AuditLog, Permission};

use crate::clients::{names::table, Query};
use crate::extractors::{Path, QueryParams};
use crate::middleware::{require_permission, CurrentUser};
use crate::pagination::{Paginated, PaginationParams};
use crate::state::AppState;

/// Create audit log routes nested under a store
pub fn audit_routes() -> Router<AppState> {
    Router::new().route("/:id/audit-logs", get(list_audit_logs))
}

/// List a store's audit trail, newest first
#[utoipa::path(
    get,
    path = "/api/stores/{id}/audit-logs",
    tag = "Audit",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID"), PaginationParams),
    responses(
        (status = 200, description = "One page of audit entries", body = crate::pagination::PaginatedAuditLogs),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_audit_logs(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    QueryParams(params): QueryParams<PaginationParams>,
) -> AppResult<Json<Paginated<AuditLog>>> {
    require_permission(&state, &current_user, store_id, Permission::ViewAudit).await?;

    let query = params.apply(
        Query::new()
            .eq("store_id", store_id)
            .order("created_at", false),
    );
    let rows: Vec<AuditLog> = state
        .baas
        .select(&current_user.caller(), table::AUDIT_LOGS, &query)
        .await?;

    Ok(Json(params.paginate(rows)))
}
