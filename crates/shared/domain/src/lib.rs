//! Domain layer - Core business entities and rules.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Rows are owned by the remote database; the types here only describe
//! their shape and the rules the gateway enforces before forwarding a call.

pub mod audit;
pub mod constants;
pub mod error;
pub mod invitation;
pub mod locale;
pub mod role;
pub mod schedule;
pub mod session;
pub mod store;
pub mod time_format;
pub mod user;

pub use audit::{AuditAction, AuditEvent, AuditLog, AuditTarget};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use invitation::{Invitation, InvitationPreview, InvitationStatus};
pub use locale::Locale;
pub use role::{Permission, StoreRole};
pub use schedule::{BreakRule, BusinessHour, Holiday, JobRole, StaffingTarget, WorkItem};
pub use session::{evaluate_session, SessionReport, SessionStatus};
pub use store::{Membership, Store};
pub use user::{AuthSession, AuthUser, MembershipSummary, UserMetadata, UserProfile};
