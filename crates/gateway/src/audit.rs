//! Best-effort audit recording.

use serde_json::{json, Value};
use tracing::{debug, warn};

use domain::AuditEvent;

use crate::clients::names::function;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Arguments for the `log_audit_event` database function.
pub(crate) fn audit_args(event: &AuditEvent) -> Value {
    json!({
        "p_store_id": event.store_id,
        "p_action": event.action,
        "p_target_type": event.target_type,
        "p_target_id": event.target_id,
        "p_details": event.details,
    })
}

/// Record a completed mutation. The mutation already happened, so a failure
/// here is logged and swallowed.
pub async fn record(state: &AppState, current_user: &CurrentUser, event: AuditEvent) {
    let result = state
        .baas
        .rpc::<Value, _>(
            &current_user.caller(),
            function::LOG_AUDIT_EVENT,
            &audit_args(&event),
        )
        .await;

    match result {
        Ok(_) => debug!(
            store_id = %event.store_id,
            action = ?event.action,
            target = ?event.target_type,
            "Audit event recorded"
        ),
        Err(e) => warn!(
            store_id = %event.store_id,
            action = ?event.action,
            error = %e,
            "Failed to record audit event"
        ),
    }
}
