//! Unified error handling for HTTP handlers.
//!
//! Provides a single error type that converts to an Axum HTTP response with
//! a stable error code and a localizable message. Messages are catalog keys
//! (see [`crate::i18n`]); the response carries an [`ErrorReport`] extension
//! so an outer layer can re-render the body in the caller's locale.

use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, Locale};
use serde::Serialize;
use thiserror::Error;

use crate::i18n;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Session expired")]
    SessionExpired,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // Rate limiting
    #[error("Too many requests")]
    TooManyRequests,

    // External service errors
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Service unavailable")]
    ServiceUnavailable(String),

    #[cfg(feature = "jwt")]
    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[cfg(feature = "cache")]
    #[error("Cache error")]
    Cache(#[from] redis::RedisError),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Attached to every error response so the body can be re-rendered
/// once the request locale is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub code: &'static str,
    pub key: String,
}

impl ErrorReport {
    /// Build the JSON envelope in the given locale
    pub fn envelope(&self, locale: Locale) -> ErrorResponse {
        ErrorResponse {
            error: ErrorBody {
                code: self.code.to_string(),
                message: i18n::translate(&self.key, locale).into_owned(),
            },
        }
    }
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::SessionExpired => "SESSION_EXPIRED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::TooManyRequests => "TOO_MANY_REQUESTS",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => "AUTH_ERROR",
            #[cfg(feature = "cache")]
            AppError::Cache(_) => "CACHE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::SessionExpired | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream { status, .. } => *status,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Catalog key (or literal text) for the user-facing message.
    /// Internal details are never part of it.
    pub fn message_key(&self) -> Cow<'_, str> {
        match self {
            AppError::Unauthorized => "error.unauthorized".into(),
            AppError::SessionExpired => "error.session_expired".into(),
            AppError::Forbidden => "error.forbidden".into(),
            AppError::InvalidCredentials => "error.invalid_credentials".into(),
            AppError::NotFound => "error.not_found".into(),
            AppError::TooManyRequests => "error.too_many_requests".into(),
            AppError::ServiceUnavailable(_) => "error.service_unavailable".into(),
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => "error.invalid_token".into(),
            #[cfg(feature = "cache")]
            AppError::Cache(_) => "error.cache".into(),
            AppError::Internal(_) => "error.internal".into(),

            // Client errors carry their own key or text
            AppError::Conflict(msg) | AppError::Validation(msg) | AppError::BadRequest(msg) => {
                Cow::Borrowed(msg.as_str())
            }

            // BaaS messages are relayed as-is
            AppError::Upstream { message, .. } if !message.is_empty() => {
                Cow::Borrowed(message.as_str())
            }
            AppError::Upstream { .. } => "error.upstream".into(),
        }
    }

    /// Get user-facing message in a locale
    pub fn user_message(&self, locale: Locale) -> String {
        i18n::translate(&self.message_key(), locale).into_owned()
    }

    /// Report attached to the HTTP response
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            key: self.message_key().into_owned(),
        }
    }

    fn log(&self) {
        match self {
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::ServiceUnavailable(service) => {
                tracing::error!("Service unavailable: {}", service)
            }
            AppError::Upstream { status, message } if status.is_server_error() => {
                tracing::error!(status = %status, "Upstream error: {}", message)
            }
            #[cfg(feature = "jwt")]
            AppError::Jwt(e) => tracing::debug!("JWT error: {:?}", e),
            #[cfg(feature = "cache")]
            AppError::Cache(e) => tracing::error!("Cache error: {:?}", e),
            _ => {}
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status();
        let report = self.report();
        let body = report.envelope(Locale::default());

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::NotFound(_) => AppError::NotFound,
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::InvitationExpired => AppError::BadRequest("error.invitation_expired".into()),
            DomainError::InvitationNotPending => {
                AppError::Conflict("error.invitation_not_pending".into())
            }
            DomainError::SelfModification => AppError::BadRequest("error.self_modification".into()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn service_unavailable(service: impl Into<String>) -> Self {
        AppError::ServiceUnavailable(service.into())
    }

    /// Map a failed BaaS response. Client statuses the caller can act on are
    /// kept; other client errors become 400 and server errors become 502.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        let status = match status {
            400 | 401 | 403 | 404 | 409 => {
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            402..=499 => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        AppError::Upstream {
            status,
            message: message.into(),
        }
    }
}
