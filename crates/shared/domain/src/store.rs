//! Store (tenant) and store membership entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::{Permission, StoreRole};

/// A store is the tenant boundary: every schedule setting belongs to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub timezone: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's role in a store (`user_store_roles` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub role: StoreRole,
    pub is_active: bool,
    #[serde(default)]
    pub granted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// Role that actually applies; deactivated members hold none.
    pub fn effective_role(&self) -> Option<StoreRole> {
        self.is_active.then_some(self.role)
    }

    /// Check a permission against the effective role
    pub fn allows(&self, permission: Permission) -> bool {
        self.effective_role()
            .map(|role| role.allows(permission))
            .unwrap_or(false)
    }

    /// Check whether this member may manage `other`
    pub fn can_manage(&self, other: &Membership) -> bool {
        self.user_id != other.user_id
            && self
                .effective_role()
                .map(|role| role.can_manage(other.role))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(role: StoreRole, is_active: bool) -> Membership {
        Membership {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            role,
            is_active,
            granted_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn inactive_membership_grants_nothing() {
        let m = membership(StoreRole::Master, false);
        assert_eq!(m.effective_role(), None);
        assert!(!m.allows(Permission::ViewStore));
    }

    #[test]
    fn active_membership_follows_role() {
        let m = membership(StoreRole::SubManager, true);
        assert!(m.allows(Permission::ManageSchedule));
        assert!(!m.allows(Permission::DeleteStore));
    }

    #[test]
    fn cannot_manage_self_even_with_rank() {
        let master = membership(StoreRole::Master, true);
        let mut same_user = membership(StoreRole::PartTimer, true);
        same_user.user_id = master.user_id;
        assert!(!master.can_manage(&same_user));

        let other = membership(StoreRole::PartTimer, true);
        assert!(master.can_manage(&other));
    }

    #[test]
    fn deserializes_remote_row() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "store_id": Uuid::new_v4(),
            "role": "PART_TIMER",
            "is_active": true,
            "created_at": "2024-03-01T09:00:00Z",
            "updated_at": "2024-03-01T09:00:00Z"
        });
        let m: Membership = serde_json::from_value(json).unwrap();
        assert_eq!(m.role, StoreRole::PartTimer);
        assert!(m.granted_by.is_none());
    }
}
