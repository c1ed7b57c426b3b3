//! Store roles and the permission matrix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_MASTER, ROLE_PART_TIMER, ROLE_SUB_MANAGER};
use crate::error::DomainError;

/// Role a user holds within a single store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreRole {
    Master,
    SubManager,
    PartTimer,
}

/// Actions gated by store role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Read store details and schedule settings
    ViewStore,
    /// Edit store details
    ManageStore,
    /// Delete the store
    DeleteStore,
    /// Create, edit and delete schedule settings
    ManageSchedule,
    /// List store members
    ViewMembers,
    /// Activate, deactivate and remove lower-ranked members
    ManageMembers,
    /// Create and cancel invitations
    InviteMembers,
    /// Read the audit trail
    ViewAudit,
}

impl StoreRole {
    fn rank(self) -> u8 {
        match self {
            StoreRole::Master => 3,
            StoreRole::SubManager => 2,
            StoreRole::PartTimer => 1,
        }
    }

    /// Wire representation of the role
    pub fn as_str(self) -> &'static str {
        match self {
            StoreRole::Master => ROLE_MASTER,
            StoreRole::SubManager => ROLE_SUB_MANAGER,
            StoreRole::PartTimer => ROLE_PART_TIMER,
        }
    }

    /// Check whether this role grants a permission.
    pub fn allows(self, permission: Permission) -> bool {
        match self {
            StoreRole::Master => true,
            StoreRole::SubManager => matches!(
                permission,
                Permission::ViewStore
                    | Permission::ManageSchedule
                    | Permission::ViewMembers
                    | Permission::ManageMembers
                    | Permission::InviteMembers
            ),
            StoreRole::PartTimer => matches!(permission, Permission::ViewStore),
        }
    }

    /// Check whether this role may invite a user into `target`.
    pub fn can_invite(self, target: StoreRole) -> bool {
        match (self, target) {
            (_, StoreRole::Master) => false,
            (StoreRole::Master, _) => true,
            (StoreRole::SubManager, StoreRole::PartTimer) => true,
            _ => false,
        }
    }

    /// Check whether this role outranks a member holding `target`.
    pub fn can_manage(self, target: StoreRole) -> bool {
        self.allows(Permission::ManageMembers) && self.rank() > target.rank()
    }

    /// Check whether this role may assign `target` to another member.
    pub fn can_grant(self, target: StoreRole) -> bool {
        self == StoreRole::Master && target != StoreRole::Master
    }
}

impl FromStr for StoreRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_MASTER => Ok(StoreRole::Master),
            ROLE_SUB_MANAGER => Ok(StoreRole::SubManager),
            ROLE_PART_TIMER => Ok(StoreRole::PartTimer),
            _ => Err(DomainError::validation("validation.role_invalid")),
        }
    }
}

impl From<StoreRole> for String {
    fn from(role: StoreRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Permission; 8] = [
        Permission::ViewStore,
        Permission::ManageStore,
        Permission::DeleteStore,
        Permission::ManageSchedule,
        Permission::ViewMembers,
        Permission::ManageMembers,
        Permission::InviteMembers,
        Permission::ViewAudit,
    ];

    #[test]
    fn master_allows_everything() {
        assert!(ALL.iter().all(|p| StoreRole::Master.allows(*p)));
    }

    #[test]
    fn sub_manager_cannot_touch_store_or_audit() {
        let role = StoreRole::SubManager;
        assert!(role.allows(Permission::ManageSchedule));
        assert!(role.allows(Permission::InviteMembers));
        assert!(!role.allows(Permission::ManageStore));
        assert!(!role.allows(Permission::DeleteStore));
        assert!(!role.allows(Permission::ViewAudit));
    }

    #[test]
    fn part_timer_is_read_only() {
        let granted: Vec<_> = ALL
            .iter()
            .filter(|p| StoreRole::PartTimer.allows(**p))
            .collect();
        assert_eq!(granted, vec![&Permission::ViewStore]);
    }

    #[test]
    fn invitation_matrix() {
        assert!(StoreRole::Master.can_invite(StoreRole::SubManager));
        assert!(StoreRole::Master.can_invite(StoreRole::PartTimer));
        assert!(!StoreRole::Master.can_invite(StoreRole::Master));
        assert!(StoreRole::SubManager.can_invite(StoreRole::PartTimer));
        assert!(!StoreRole::SubManager.can_invite(StoreRole::SubManager));
        assert!(!StoreRole::PartTimer.can_invite(StoreRole::PartTimer));
    }

    #[test]
    fn manage_requires_strictly_higher_rank() {
        assert!(StoreRole::Master.can_manage(StoreRole::SubManager));
        assert!(StoreRole::SubManager.can_manage(StoreRole::PartTimer));
        assert!(!StoreRole::SubManager.can_manage(StoreRole::SubManager));
        assert!(!StoreRole::SubManager.can_manage(StoreRole::Master));
        assert!(!StoreRole::PartTimer.can_manage(StoreRole::PartTimer));
    }

    #[test]
    fn only_master_grants_and_never_master() {
        assert!(StoreRole::Master.can_grant(StoreRole::SubManager));
        assert!(StoreRole::Master.can_grant(StoreRole::PartTimer));
        assert!(!StoreRole::Master.can_grant(StoreRole::Master));
        assert!(!StoreRole::SubManager.can_grant(StoreRole::PartTimer));
    }

    #[test]
    fn parses_wire_names_only() {
        assert_eq!("MASTER".parse::<StoreRole>(), Ok(StoreRole::Master));
        assert_eq!("PART_TIMER".parse::<StoreRole>(), Ok(StoreRole::PartTimer));
        assert!("master".parse::<StoreRole>().is_err());
        assert!("ADMIN".parse::<StoreRole>().is_err());
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&StoreRole::SubManager).unwrap();
        assert_eq!(json, "\"SUB_MANAGER\"");
        let role: StoreRole = serde_json::from_str("\"PART_TIMER\"").unwrap();
        assert_eq!(role, StoreRole::PartTimer);
    }
}
