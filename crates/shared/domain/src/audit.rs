//! Audit trail entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Replace,
    Invite,
    CancelInvite,
    AcceptInvite,
    GrantRole,
    RevokeRole,
    Activate,
    Deactivate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditTarget {
    Store,
    Invitation,
    Member,
    BreakRule,
    StaffingTarget,
    WorkItem,
    BusinessHours,
    Holiday,
    JobRole,
}

/// An event to record; the actor is taken from the caller's session remotely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub store_id: Uuid,
    pub action: AuditAction,
    pub target_type: AuditTarget,
    pub target_id: Option<Uuid>,
    pub details: Value,
}

impl AuditEvent {
    pub fn new(store_id: Uuid, action: AuditAction, target_type: AuditTarget) -> Self {
        Self {
            store_id,
            action,
            target_type,
            target_id: None,
            details: Value::Object(Default::default()),
        }
    }

    pub fn target(mut self, id: Uuid) -> Self {
        self.target_id = Some(id);
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Stored audit row. Action and target stay strings so rows written by
/// other clients still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuditLog {
    pub id: Uuid,
    pub store_id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub target_type: String,
    #[serde(default)]
    pub target_id: Option<Uuid>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub details: Value,
    pub created_at: DateTime<Utc>,
}
