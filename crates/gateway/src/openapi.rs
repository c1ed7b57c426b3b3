//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use domain::{
    AuditLog, AuthSession, AuthUser, BreakRule, BusinessHour, Holiday, Invitation,
    InvitationPreview, InvitationStatus, JobRole, Locale, Membership, MembershipSummary,
    SessionReport, SessionStatus, StaffingTarget, Store, StoreRole, UserProfile, WorkItem,
};

use crate::handlers::{
    auth_handler::{RefreshRequest, SignInRequest, SignUpRequest},
    break_rule_handler::{CreateBreakRuleRequest, UpdateBreakRuleRequest},
    business_hour_handler::{BusinessHourInput, ReplaceBusinessHoursRequest},
    health_handler::{HealthResponse, ServiceHealth, ServiceStatus},
    holiday_handler::{CreateHolidayRequest, UpdateHolidayRequest},
    invitation_handler::CreateInvitationRequest,
    job_role_handler::{CreateJobRoleRequest, UpdateJobRoleRequest},
    locale_handler::{LocaleResponse, PageContext, SetLocaleRequest},
    member_handler::GrantRoleRequest,
    staffing_target_handler::{CreateStaffingTargetRequest, UpdateStaffingTargetRequest},
    store_handler::{CreateStoreRequest, StoreSettings, UpdateStoreRequest},
    work_item_handler::{CreateWorkItemRequest, UpdateWorkItemRequest},
};
use crate::pagination::{PaginatedAuditLogs, PaginationMeta};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::auth_handler::sign_in,
        crate::handlers::auth_handler::sign_up,
        crate::handlers::auth_handler::refresh,
        crate::handlers::auth_handler::sign_out,
        crate::handlers::auth_handler::session,
        crate::handlers::locale_handler::get_locale,
        crate::handlers::locale_handler::set_locale,
        crate::handlers::me_handler::get_me,
        crate::handlers::store_handler::list_stores,
        crate::handlers::store_handler::create_store,
        crate::handlers::store_handler::get_store,
        crate::handlers::store_handler::update_store,
        crate::handlers::store_handler::delete_store,
        crate::handlers::store_handler::get_settings,
        crate::handlers::member_handler::list_members,
        crate::handlers::member_handler::grant_role,
        crate::handlers::member_handler::revoke_member,
        crate::handlers::member_handler::activate_member,
        crate::handlers::member_handler::deactivate_member,
        crate::handlers::invitation_handler::list_invitations,
        crate::handlers::invitation_handler::create_invitation,
        crate::handlers::invitation_handler::cancel_invitation,
        crate::handlers::invitation_handler::get_invitation,
        crate::handlers::invitation_handler::accept_invitation,
        crate::handlers::business_hour_handler::list_business_hours,
        crate::handlers::business_hour_handler::replace_business_hours,
        crate::handlers::holiday_handler::list_holidays,
        crate::handlers::holiday_handler::create_holiday,
        crate::handlers::holiday_handler::update_holiday,
        crate::handlers::holiday_handler::delete_holiday,
        crate::handlers::break_rule_handler::list_break_rules,
        crate::handlers::break_rule_handler::create_break_rule,
        crate::handlers::break_rule_handler::update_break_rule,
        crate::handlers::break_rule_handler::delete_break_rule,
        crate::handlers::work_item_handler::list_work_items,
        crate::handlers::work_item_handler::create_work_item,
        crate::handlers::work_item_handler::update_work_item,
        crate::handlers::work_item_handler::delete_work_item,
        crate::handlers::staffing_target_handler::list_staffing_targets,
        crate::handlers::staffing_target_handler::create_staffing_target,
        crate::handlers::staffing_target_handler::update_staffing_target,
        crate::handlers::staffing_target_handler::delete_staffing_target,
        crate::handlers::job_role_handler::list_job_roles,
        crate::handlers::job_role_handler::create_job_role,
        crate::handlers::job_role_handler::update_job_role,
        crate::handlers::job_role_handler::delete_job_role,
        crate::handlers::audit_handler::list_audit_logs,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceStatus,
            ServiceHealth,
            SignInRequest,
            SignUpRequest,
            RefreshRequest,
            AuthSession,
            AuthUser,
            SessionReport,
            SessionStatus,
            Locale,
            SetLocaleRequest,
            LocaleResponse,
            PageContext,
            UserProfile,
            MembershipSummary,
            Store,
            StoreRole,
            Membership,
            CreateStoreRequest,
            UpdateStoreRequest,
            StoreSettings,
            GrantRoleRequest,
            Invitation,
            InvitationPreview,
            InvitationStatus,
            CreateInvitationRequest,
            BusinessHour,
            BusinessHourInput,
            ReplaceBusinessHoursRequest,
            Holiday,
            CreateHolidayRequest,
            UpdateHolidayRequest,
            BreakRule,
            CreateBreakRuleRequest,
            UpdateBreakRuleRequest,
            WorkItem,
            CreateWorkItemRequest,
            UpdateWorkItemRequest,
            StaffingTarget,
            CreateStaffingTargetRequest,
            UpdateStaffingTargetRequest,
            JobRole,
            CreateJobRoleRequest,
            UpdateJobRoleRequest,
            AuditLog,
            PaginatedAuditLogs,
            PaginationMeta,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Sign-in, sign-up and session endpoints"),
        (name = "Locale", description = "Locale negotiation"),
        (name = "Users", description = "Current user"),
        (name = "Stores", description = "Store management"),
        (name = "Members", description = "Store roles and member standing"),
        (name = "Invitations", description = "Store invitations"),
        (name = "Schedule settings", description = "Business hours, holidays, break rules, work items, staffing targets and job roles"),
        (name = "Audit", description = "Store audit trail"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
