//! Remote table and database function names.

pub mod table {
    pub const STORES: &str = "stores";
    pub const INVITATIONS: &str = "invitations";
    pub const USER_STORE_ROLES: &str = "user_store_roles";
    pub const BREAK_RULES: &str = "break_rules";
    pub const STAFFING_TARGETS: &str = "staffing_targets";
    pub const WORK_ITEMS: &str = "work_items";
    pub const BUSINESS_HOURS: &str = "business_hours";
    pub const HOLIDAYS: &str = "holidays";
    pub const JOB_ROLES: &str = "job_roles";
    pub const AUDIT_LOGS: &str = "audit_logs";
}

pub mod function {
    pub const CREATE_STORE: &str = "create_store";
    pub const CREATE_INVITATION: &str = "create_invitation";
    pub const GET_INVITATION: &str = "get_invitation";
    pub const ACCEPT_INVITATION: &str = "accept_invitation";
    pub const GRANT_USER_ROLE: &str = "grant_user_role";
    pub const REVOKE_USER_ROLE: &str = "revoke_user_role";
    pub const ACTIVATE_USER: &str = "activate_user";
    pub const DEACTIVATE_USER: &str = "deactivate_user";
    pub const LOG_AUDIT_EVENT: &str = "log_audit_event";
}
