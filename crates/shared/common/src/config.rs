//! Shared configuration structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hosted backend (auth + database) connection settings.
#[derive(Clone, Deserialize, Serialize)]
pub struct BaasConfig {
    /// Project base URL, e.g. `https://xyz.example.co`
    pub url: String,
    /// Public (anon) API key sent with every request
    #[serde(skip_serializing)]
    pub anon_key: String,
    /// Secret used to verify user access tokens (HS256)
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl fmt::Debug for BaasConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaasConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for BaasConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            jwt_secret: String::new(),
            timeout_seconds: 10,
        }
    }
}

/// Redis cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis URL; caching and rate limiting are off when unset
    pub url: Option<String>,
    pub membership_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            membership_ttl_seconds: 60,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u64,
    /// Window size in seconds
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_seconds: 60,
        }
    }
}

/// Session cookie and polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Interval clients poll the session endpoint at
    pub poll_interval_seconds: i64,
    /// How long before expiry a session is reported as due for refresh
    pub refresh_margin_seconds: i64,
    /// Mark auth cookies `Secure`
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
            refresh_margin_seconds: 300,
            cookie_secure: true,
        }
    }
}
