//! Middleware for authentication, locale, rate limiting, and caching.

mod access;
mod auth;
mod cache;
mod locale;
mod rate_limit;

pub use access::{invalidate_membership, load_membership, require_permission};
pub use auth::{auth_middleware, AccessClaims, CurrentUser, TokenVerifier};
pub(crate) use auth::extract_token;
pub use cache::Cache;
pub use locale::{locale_cookie, locale_middleware};
pub use rate_limit::{rate_limit_auth_middleware, rate_limit_middleware};
