//! Store-scoped permission checks.

use tracing::{debug, warn};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{Membership, Permission};

use crate::clients::{names::table, Query};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Look up a user's membership in a store, cache first.
pub async fn load_membership(
    state: &AppState,
    current_user: &CurrentUser,
    store_id: Uuid,
    user_id: Uuid,
) -> AppResult<Option<Membership>> {
    if let Some(cache) = &state.cache {
        match cache.get_membership(&store_id, &user_id).await {
            Ok(Some(membership)) => return Ok(Some(membership)),
            Ok(None) => {}
            Err(e) => warn!(store_id = %store_id, error = %e, "Membership cache read failed"),
        }
    }

    let membership: Option<Membership> = state
        .baas
        .select_one(
            &current_user.caller(),
            table::USER_STORE_ROLES,
            Query::new().eq("store_id", store_id).eq("user_id", user_id),
        )
        .await?;

    if let (Some(cache), Some(m)) = (&state.cache, &membership) {
        if let Err(e) = cache.set_membership(m).await {
            warn!(store_id = %store_id, error = %e, "Membership cache write failed");
        }
    }

    Ok(membership)
}

/// Check that the caller holds `permission` in the store and return their
/// membership. Non-members are refused the same way as under-privileged
/// members so store IDs cannot be discovered.
pub async fn require_permission(
    state: &AppState,
    current_user: &CurrentUser,
    store_id: Uuid,
    permission: Permission,
) -> AppResult<Membership> {
    let membership = load_membership(state, current_user, store_id, current_user.id)
        .await?
        .ok_or(AppError::Forbidden)?;

    if membership.allows(permission) {
        Ok(membership)
    } else {
        debug!(
            store_id = %store_id,
            user_id = %current_user.id,
            role = %membership.role,
            ?permission,
            "Permission denied"
        );
        Err(AppError::Forbidden)
    }
}

/// Drop a cached membership; failures only delay the change by one TTL.
pub async fn invalidate_membership(state: &AppState, store_id: Uuid, user_id: Uuid) {
    if let Some(cache) = &state.cache {
        if let Err(e) = cache.invalidate_membership(&store_id, &user_id).await {
            warn!(store_id = %store_id, user_id = %user_id, error = %e, "Membership cache invalidation failed");
        }
    }
}
