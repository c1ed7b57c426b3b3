//! Gateway configuration.

use std::env;
use std::str::FromStr;

use common::{BaasConfig, CacheConfig, RateLimitConfig, SessionConfig};
use domain::Locale;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Hosted auth + database backend
    pub baas: BaasConfig,
    /// Redis cache (optional)
    pub cache: CacheConfig,
    /// Session cookies and polling
    pub session: SessionConfig,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Locale used when neither cookie nor header decides
    pub default_locale: Locale,
    /// Origins allowed by CORS; empty disables the CORS layer
    pub cors_allowed_origins: Vec<String>,
    /// General rate limit
    pub rate_limit: RateLimitConfig,
    /// Stricter rate limit for sign-in/sign-up
    pub rate_limit_auth: RateLimitConfig,
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            baas: BaasConfig {
                url: env::var("BAAS_URL").unwrap_or(defaults.baas.url),
                anon_key: env::var("BAAS_ANON_KEY").unwrap_or_default(),
                jwt_secret: env::var("BAAS_JWT_SECRET").unwrap_or_default(),
                timeout_seconds: parsed("BAAS_TIMEOUT_SECONDS")
                    .unwrap_or(defaults.baas.timeout_seconds),
            },
            cache: CacheConfig {
                url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
                membership_ttl_seconds: parsed("MEMBERSHIP_CACHE_TTL_SECONDS")
                    .unwrap_or(defaults.cache.membership_ttl_seconds),
            },
            session: SessionConfig {
                poll_interval_seconds: parsed("SESSION_POLL_INTERVAL_SECONDS")
                    .unwrap_or(defaults.session.poll_interval_seconds),
                refresh_margin_seconds: parsed("SESSION_REFRESH_MARGIN_SECONDS")
                    .unwrap_or(defaults.session.refresh_margin_seconds),
                cookie_secure: parsed("COOKIE_SECURE").unwrap_or(defaults.session.cookie_secure),
            },
            host: env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: parsed("SERVER_PORT").unwrap_or(defaults.port),
            default_locale: env::var("DEFAULT_LOCALE")
                .ok()
                .and_then(|tag| Locale::from_tag(&tag))
                .unwrap_or(defaults.default_locale),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            rate_limit: RateLimitConfig {
                max_requests: parsed("RATE_LIMIT_REQUESTS")
                    .unwrap_or(defaults.rate_limit.max_requests),
                window_seconds: parsed("RATE_LIMIT_WINDOW_SECONDS")
                    .unwrap_or(defaults.rate_limit.window_seconds),
            },
            rate_limit_auth: RateLimitConfig {
                max_requests: parsed("RATE_LIMIT_AUTH_REQUESTS")
                    .unwrap_or(defaults.rate_limit_auth.max_requests),
                window_seconds: parsed("RATE_LIMIT_AUTH_WINDOW_SECONDS")
                    .unwrap_or(defaults.rate_limit_auth.window_seconds),
            },
        }
    }

    /// List problems that prevent the server from starting.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.baas.url.is_empty() {
            problems.push("BAAS_URL must be set".to_string());
        }
        if self.baas.anon_key.is_empty() {
            problems.push("BAAS_ANON_KEY must be set".to_string());
        }
        if self.baas.jwt_secret.is_empty() {
            problems.push("BAAS_JWT_SECRET must be set".to_string());
        }
        if self.session.refresh_margin_seconds < 0 || self.session.poll_interval_seconds <= 0 {
            problems.push("session intervals must be positive".to_string());
        }
        problems
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            baas: BaasConfig::default(),
            cache: CacheConfig::default(),
            session: SessionConfig::default(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            default_locale: Locale::Ko,
            cors_allowed_origins: Vec::new(),
            rate_limit: RateLimitConfig::default(),
            rate_limit_auth: RateLimitConfig {
                max_requests: 10,
                window_seconds: 60,
            },
        }
    }
}
