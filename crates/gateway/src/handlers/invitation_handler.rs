//! Invitation handlers.
//!
//! Managers create and cancel invitations inside a store; invitees look one
//! up by token before signing in and accept it afterwards.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult, OptionExt};
use domain::{
    AuditAction, AuditEvent, AuditTarget, Invitation, InvitationPreview, InvitationStatus,
    Membership, Permission, StoreRole, DEFAULT_INVITATION_DAYS,
};

use crate::audit;
use crate::clients::{
    names::{function, table},
    Caller, Query,
};
use crate::extractors::{Path, QueryParams, ValidatedJson};
use crate::middleware::{invalidate_membership, require_permission, CurrentUser};
use crate::state::AppState;

/// Invitation creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInvitationRequest {
    #[validate(email(message = "validation.email_invalid"))]
    #[schema(example = "staff@example.com")]
    pub email: String,
    /// SUB_MANAGER or PART_TIMER
    pub role: StoreRole,
    /// Days until the invitation lapses (1..=30, default 7)
    #[validate(range(min = 1, max = 30, message = "validation.expiry_days_range"))]
    pub expires_in_days: Option<i64>,
}

/// Invitation list filter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvitationFilter {
    /// Only invitations currently in this status
    pub status: Option<InvitationStatus>,
}

/// Create invitation routes nested under a store
pub fn store_invitation_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/invitations", get(list_invitations).post(create_invitation))
        .route("/:id/invitations/:invitation_id", delete(cancel_invitation))
}

/// Create routes for invitees; acceptance needs a session
pub fn invitee_routes() -> Router<AppState> {
    Router::new().route("/:token/accept", post(accept_invitation))
}

/// Create the public invitation lookup route
pub fn public_invitation_routes() -> Router<AppState> {
    Router::new().route("/:token", get(get_invitation))
}

/// Stored statuses that can read as `status` once expiry is applied.
fn stored_statuses(status: InvitationStatus) -> Vec<InvitationStatus> {
    match status {
        InvitationStatus::Expired => vec![InvitationStatus::Pending, InvitationStatus::Expired],
        other => vec![other],
    }
}

/// List invitations of a store
#[utoipa::path(
    get,
    path = "/api/stores/{id}/invitations",
    tag = "Invitations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID"), InvitationFilter),
    responses(
        (status = 200, description = "Invitations, newest first", body = Vec<Invitation>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_invitations(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    QueryParams(filter): QueryParams<InvitationFilter>,
) -> AppResult<Json<Vec<Invitation>>> {
    require_permission(&state, &current_user, store_id, Permission::InviteMembers).await?;

    let mut query = Query::new().eq("store_id", store_id);
    if let Some(status) = filter.status {
        query = query.is_in(
            "status",
            stored_statuses(status).into_iter().map(InvitationStatus::as_str),
        );
    }

    let invitations: Vec<Invitation> = state
        .baas
        .select(
            &current_user.caller(),
            table::INVITATIONS,
            &query.order("created_at", false),
        )
        .await?;

    let now = Utc::now();
    let invitations = invitations
        .into_iter()
        .map(|mut inv| {
            inv.status = inv.status_at(now);
            inv
        })
        .filter(|inv| filter.status.map_or(true, |s| inv.status == s))
        .collect();

    Ok(Json(invitations))
}

/// Invite someone into a store
#[utoipa::path(
    post,
    path = "/api/stores/{id}/invitations",
    tag = "Invitations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = CreateInvitationRequest,
    responses(
        (status = 201, description = "Invitation created", body = Invitation),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Role may not invite this role")
    )
)]
pub async fn create_invitation(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateInvitationRequest>,
) -> AppResult<(StatusCode, Json<Invitation>)> {
    let membership =
        require_permission(&state, &current_user, store_id, Permission::InviteMembers).await?;

    if payload.role == StoreRole::Master {
        return Err(AppError::validation("validation.role_not_invitable"));
    }
    if !membership.role.can_invite(payload.role) {
        return Err(AppError::Forbidden);
    }

    let email = payload.email.trim().to_lowercase();
    let args = json!({
        "p_store_id": store_id,
        "p_email": email,
        "p_role": payload.role,
        "p_expires_in_days": payload.expires_in_days.unwrap_or(DEFAULT_INVITATION_DAYS),
    });

    let invitation: Invitation = state
        .baas
        .rpc_row(&current_user.caller(), function::CREATE_INVITATION, &args)
        .await?
        .ok_or_else(|| AppError::internal("create_invitation returned no row"))?;

    info!(store_id = %store_id, invitation_id = %invitation.id, role = %invitation.role, "Invitation created");

    let event = AuditEvent::new(store_id, AuditAction::Invite, AuditTarget::Invitation)
        .target(invitation.id)
        .details(json!({ "email": invitation.email, "role": invitation.role }));
    audit::record(&state, &current_user, event).await;

    Ok((StatusCode::CREATED, Json(invitation)))
}

/// Cancel a pending invitation
#[utoipa::path(
    delete,
    path = "/api/stores/{id}/invitations/{invitation_id}",
    tag = "Invitations",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("invitation_id" = Uuid, Path, description = "Invitation ID")
    ),
    responses(
        (status = 200, description = "Invitation cancelled", body = Invitation),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Invitation not found"),
        (status = 409, description = "Invitation is no longer pending")
    )
)]
pub async fn cancel_invitation(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((store_id, invitation_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Invitation>> {
    require_permission(&state, &current_user, store_id, Permission::InviteMembers).await?;

    let caller = current_user.caller();
    let scoped = Query::new().eq("id", invitation_id).eq("store_id", store_id);

    let invitation: Invitation = state
        .baas
        .select_one(&caller, table::INVITATIONS, scoped.clone())
        .await?
        .ok_or_not_found()?;
    invitation.ensure_cancellable()?;

    // Only flips rows still pending, so a concurrent accept wins
    let cancelled: Invitation = state
        .baas
        .update(
            &caller,
            table::INVITATIONS,
            &scoped.eq("status", InvitationStatus::Pending.as_str()),
            &json!({ "status": InvitationStatus::Cancelled }),
        )
        .await
        .map_err(|e| match e {
            AppError::NotFound => AppError::conflict("error.invitation_not_pending"),
            other => other,
        })?;

    let event = AuditEvent::new(store_id, AuditAction::CancelInvite, AuditTarget::Invitation)
        .target(invitation_id);
    audit::record(&state, &current_user, event).await;

    Ok(Json(cancelled))
}

/// Look up an invitation by token (no session required)
#[utoipa::path(
    get,
    path = "/api/invitations/{token}",
    tag = "Invitations",
    params(("token" = String, Path, description = "Invitation token")),
    responses(
        (status = 200, description = "Invitation summary", body = InvitationPreview),
        (status = 404, description = "Unknown token")
    )
)]
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<InvitationPreview>> {
    let preview: InvitationPreview = state
        .baas
        .rpc_row(&Caller::Anonymous, function::GET_INVITATION, &json!({ "p_token": token }))
        .await?
        .ok_or_not_found()?;

    Ok(Json(preview.settle(Utc::now())))
}

/// Accept an invitation as the signed-in user
#[utoipa::path(
    post,
    path = "/api/invitations/{token}/accept",
    tag = "Invitations",
    security(("bearer_auth" = [])),
    params(("token" = String, Path, description = "Invitation token")),
    responses(
        (status = 200, description = "Joined the store", body = Membership),
        (status = 400, description = "Invitation expired"),
        (status = 404, description = "Unknown token"),
        (status = 409, description = "Invitation is no longer pending")
    )
)]
pub async fn accept_invitation(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<Membership>> {
    let caller = current_user.caller();
    let args = json!({ "p_token": token });

    let preview: InvitationPreview = state
        .baas
        .rpc_row(&caller, function::GET_INVITATION, &args)
        .await?
        .ok_or_not_found()?;
    preview.ensure_acceptable(Utc::now())?;

    let membership: Membership = state
        .baas
        .rpc_row(&caller, function::ACCEPT_INVITATION, &args)
        .await?
        .ok_or_else(|| AppError::internal("accept_invitation returned no row"))?;

    invalidate_membership(&state, membership.store_id, current_user.id).await;
    info!(store_id = %membership.store_id, user_id = %current_user.id, role = %membership.role, "Invitation accepted");

    let event = AuditEvent::new(
        membership.store_id,
        AuditAction::AcceptInvite,
        AuditTarget::Invitation,
    )
    .target(membership.id)
    .details(json!({ "role": membership.role }));
    audit::record(&state, &current_user, event).await;

    Ok(Json(membership))
}
