//! Store member handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult, OptionExt};
use domain::{
    AuditAction, AuditEvent, AuditTarget, DomainError, Membership, Permission, StoreRole,
};

use crate::audit;
use crate::clients::{
    names::{function, table},
    Query,
};
use crate::extractors::{Path, ValidatedJson};
use crate::middleware::{
    invalidate_membership, load_membership, require_permission, CurrentUser,
};
use crate::state::AppState;

/// Role change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GrantRoleRequest {
    /// SUB_MANAGER or PART_TIMER
    pub role: StoreRole,
}

/// Create member routes nested under a store
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/members", get(list_members))
        .route("/:id/members/:user_id", delete(revoke_member))
        .route("/:id/members/:user_id/role", put(grant_role))
        .route("/:id/members/:user_id/activate", post(activate_member))
        .route("/:id/members/:user_id/deactivate", post(deactivate_member))
}

/// Member operations that act on another member's standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberChange {
    Revoke,
    Activate,
    Deactivate,
}

impl MemberChange {
    fn function(self) -> &'static str {
        match self {
            MemberChange::Revoke => function::REVOKE_USER_ROLE,
            MemberChange::Activate => function::ACTIVATE_USER,
            MemberChange::Deactivate => function::DEACTIVATE_USER,
        }
    }

    fn action(self) -> AuditAction {
        match self {
            MemberChange::Revoke => AuditAction::RevokeRole,
            MemberChange::Activate => AuditAction::Activate,
            MemberChange::Deactivate => AuditAction::Deactivate,
        }
    }
}

fn reject_self(current_user: &CurrentUser, user_id: Uuid) -> AppResult<()> {
    if current_user.id == user_id {
        Err(DomainError::SelfModification.into())
    } else {
        Ok(())
    }
}

/// Check, forward and record a revoke/activate/deactivate.
async fn change_member(
    state: &AppState,
    current_user: &CurrentUser,
    store_id: Uuid,
    user_id: Uuid,
    change: MemberChange,
) -> AppResult<()> {
    reject_self(current_user, user_id)?;
    let actor = require_permission(state, current_user, store_id, Permission::ManageMembers).await?;

    let target = load_membership(state, current_user, store_id, user_id)
        .await?
        .ok_or_not_found()?;
    if !actor.can_manage(&target) {
        return Err(AppError::Forbidden);
    }

    let args = json!({ "p_store_id": store_id, "p_user_id": user_id });
    state
        .baas
        .rpc::<serde_json::Value, _>(&current_user.caller(), change.function(), &args)
        .await?;

    invalidate_membership(state, store_id, user_id).await;
    info!(store_id = %store_id, user_id = %user_id, change = ?change, "Member changed");

    let event = AuditEvent::new(store_id, change.action(), AuditTarget::Member)
        .target(user_id)
        .details(json!({ "role": target.role }));
    audit::record(state, current_user, event).await;

    Ok(())
}

/// List members of a store
#[utoipa::path(
    get,
    path = "/api/stores/{id}/members",
    tag = "Members",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Members, oldest first", body = Vec<Membership>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_members(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<Membership>>> {
    require_permission(&state, &current_user, store_id, Permission::ViewMembers).await?;

    let members = state
        .baas
        .select(
            &current_user.caller(),
            table::USER_STORE_ROLES,
            &Query::new()
                .eq("store_id", store_id)
                .order("created_at", true),
        )
        .await?;

    Ok(Json(members))
}

/// Change a member's role (MASTER)
#[utoipa::path(
    put,
    path = "/api/stores/{id}/members/{user_id}/role",
    tag = "Members",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("user_id" = Uuid, Path, description = "Member's user ID")
    ),
    request_body = GrantRoleRequest,
    responses(
        (status = 204, description = "Role granted"),
        (status = 400, description = "Role cannot be granted, or target is the caller"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn grant_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, user_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<GrantRoleRequest>,
) -> AppResult<StatusCode> {
    reject_self(&current_user, user_id)?;
    let actor =
        require_permission(&state, &current_user, store_id, Permission::ManageMembers).await?;

    if payload.role == StoreRole::Master {
        return Err(AppError::validation("validation.role_not_grantable"));
    }
    if !actor.role.can_grant(payload.role) {
        return Err(AppError::Forbidden);
    }

    let args = json!({
        "p_store_id": store_id,
        "p_user_id": user_id,
        "p_role": payload.role,
    });
    state
        .baas
        .rpc::<serde_json::Value, _>(&current_user.caller(), function::GRANT_USER_ROLE, &args)
        .await?;

    invalidate_membership(&state, store_id, user_id).await;
    info!(store_id = %store_id, user_id = %user_id, role = %payload.role, "Role granted");

    let event = AuditEvent::new(store_id, AuditAction::GrantRole, AuditTarget::Member)
        .target(user_id)
        .details(json!({ "role": payload.role }));
    audit::record(&state, &current_user, event).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a member from a store
#[utoipa::path(
    delete,
    path = "/api/stores/{id}/members/{user_id}",
    tag = "Members",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("user_id" = Uuid, Path, description = "Member's user ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 400, description = "Target is the caller"),
        (status = 403, description = "Target is not lower-ranked"),
        (status = 404, description = "Not a member")
    )
)]
pub async fn revoke_member(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    change_member(&state, &current_user, store_id, user_id, MemberChange::Revoke).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reactivate a member
#[utoipa::path(
    post,
    path = "/api/stores/{id}/members/{user_id}/activate",
    tag = "Members",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("user_id" = Uuid, Path, description = "Member's user ID")
    ),
    responses(
        (status = 204, description = "Member activated"),
        (status = 403, description = "Target is not lower-ranked"),
        (status = 404, description = "Not a member")
    )
)]
pub async fn activate_member(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    change_member(&state, &current_user, store_id, user_id, MemberChange::Activate).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deactivate a member; they keep their role but lose access
#[utoipa::path(
    post,
    path = "/api/stores/{id}/members/{user_id}/deactivate",
    tag = "Members",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("user_id" = Uuid, Path, description = "Member's user ID")
    ),
    responses(
        (status = 204, description = "Member deactivated"),
        (status = 403, description = "Target is not lower-ranked"),
        (status = 404, description = "Not a member")
    )
)]
pub async fn deactivate_member(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    change_member(&state, &current_user, store_id, user_id, MemberChange::Deactivate).await?;
    Ok(StatusCode::NO_CONTENT)
}
