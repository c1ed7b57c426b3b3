//! Current user handler.

use axum::{
    extract::{Extension, State},
    response::Json,
};

use common::AppResult;
use domain::{Membership, MembershipSummary, UserProfile};

use crate::clients::{names::table, Query};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Get the current user and their store memberships
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserProfile>> {
    let memberships: Vec<Membership> = state
        .baas
        .select(
            &current_user.caller(),
            table::USER_STORE_ROLES,
            &Query::new()
                .eq("user_id", current_user.id)
                .order("created_at", true),
        )
        .await?;

    Ok(Json(UserProfile {
        id: current_user.id,
        email: current_user.email.clone(),
        memberships: memberships.iter().map(MembershipSummary::from).collect(),
    }))
}
