//! HTTP handlers.

pub mod audit_handler;
pub mod auth_handler;
pub mod break_rule_handler;
pub mod business_hour_handler;
pub mod health_handler;
pub mod holiday_handler;
pub mod invitation_handler;
pub mod job_role_handler;
pub mod locale_handler;
pub mod me_handler;
pub mod member_handler;
pub mod staffing_target_handler;
pub mod store_handler;
pub mod work_item_handler;

pub use audit_handler::audit_routes;
pub use auth_handler::{auth_routes, session_routes};
pub use break_rule_handler::break_rule_routes;
pub use business_hour_handler::business_hour_routes;
pub use health_handler::health_routes;
pub use holiday_handler::holiday_routes;
pub use invitation_handler::{invitee_routes, public_invitation_routes, store_invitation_routes};
pub use job_role_handler::job_role_routes;
pub use locale_handler::{get_locale, page_fallback, set_locale};
pub use me_handler::get_me;
pub use member_handler::member_routes;
pub use staffing_target_handler::staffing_target_routes;
pub use store_handler::store_routes;
pub use work_item_handler::work_item_routes;
