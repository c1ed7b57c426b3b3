//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Store Roles
// =============================================================================

/// Store owner with full control
pub const ROLE_MASTER: &str = "MASTER";

/// Manager who edits schedule settings and invites part-timers
pub const ROLE_SUB_MANAGER: &str = "SUB_MANAGER";

/// Staff member with read-only access to schedule settings
pub const ROLE_PART_TIMER: &str = "PART_TIMER";

// =============================================================================
// Validation
// =============================================================================

/// Days of the week, Sunday = 0
pub const MIN_WEEKDAY: u8 = 0;
pub const MAX_WEEKDAY: u8 = 6;

/// Default store timezone
pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";

// =============================================================================
// Invitations
// =============================================================================

/// Default invitation lifetime in days
pub const DEFAULT_INVITATION_DAYS: i64 = 7;

// =============================================================================
// Authentication
// =============================================================================

/// Audience claim carried by user access tokens
pub const TOKEN_AUDIENCE: &str = "authenticated";

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// Cookie holding the access token
pub const ACCESS_TOKEN_COOKIE: &str = "wk-access-token";

/// Cookie holding the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "wk-refresh-token";

/// Cookie holding the preferred locale
pub const LOCALE_COOKIE: &str = "wk-locale";

// =============================================================================
// Pagination
// =============================================================================

/// First page number
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Default items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum items per page
pub const MAX_PAGE_SIZE: u64 = 100;
