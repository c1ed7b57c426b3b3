//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{
    AuthSession, AuthUser, Locale, SessionReport, UserMetadata, ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
};

use crate::extractors::ValidatedJson;
use crate::middleware::{extract_token, CurrentUser};
use crate::state::AppState;

/// Sign-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(email(message = "validation.email_invalid"))]
    #[schema(example = "owner@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "validation.password_required"))]
    pub password: String,
}

/// Sign-up request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    #[validate(email(message = "validation.email_invalid"))]
    #[schema(example = "staff@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "validation.password_length"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "validation.name_length"))]
    #[schema(example = "Kim Minji")]
    pub display_name: String,
    /// Preferred UI locale
    pub locale: Option<Locale>,
}

/// Refresh request; the token falls back to the refresh cookie
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Create public auth routes (rate limited separately)
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", post(sign_in))
        .route("/sign-up", post(sign_up))
        .route("/refresh", post(refresh))
        .route("/sign-out", post(sign_out))
}

/// Create auth routes that need a verified session
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/session", get(session))
}

fn token_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn with_session_cookies(jar: CookieJar, session: &AuthSession, secure: bool) -> CookieJar {
    jar.add(token_cookie(ACCESS_TOKEN_COOKIE, session.access_token.clone(), secure))
        .add(token_cookie(REFRESH_TOKEN_COOKIE, session.refresh_token.clone(), secure))
}

fn without_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    tag = "Authentication",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in; session cookies set", body = AuthSession),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<SignInRequest>,
) -> AppResult<(CookieJar, Json<AuthSession>)> {
    let email = payload.email.trim().to_lowercase();
    let session = state.baas.sign_in(&email, &payload.password).await?;

    if let Some(user) = &session.user {
        info!(user_id = %user.id, "User signed in");
    }

    let jar = with_session_cookies(jar, &session, state.config.session.cookie_secure);
    Ok((jar, Json(session)))
}

/// Create an account
#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    tag = "Authentication",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = AuthUser),
        (status = 400, description = "Validation error"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Extension(locale): Extension<Locale>,
    ValidatedJson(payload): ValidatedJson<SignUpRequest>,
) -> AppResult<(StatusCode, Json<AuthUser>)> {
    let metadata = UserMetadata {
        display_name: Some(payload.display_name.trim().to_string()),
        locale: Some(payload.locale.unwrap_or(locale)),
    };
    let email = payload.email.trim().to_lowercase();

    let user = state.baas.sign_up(&email, &payload.password, &metadata).await?;
    info!(user_id = %user.id, "User signed up");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange a refresh token for a new session
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Authentication",
    request_body(content = RefreshRequest, description = "Optional; the refresh cookie is used otherwise"),
    responses(
        (status = 200, description = "Session refreshed; cookies updated", body = AuthSession),
        (status = 400, description = "No refresh token supplied"),
        (status = 401, description = "Refresh token rejected")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Option<Json<RefreshRequest>>,
) -> AppResult<(CookieJar, Json<AuthSession>)> {
    let from_body = payload
        .and_then(|Json(body)| body.refresh_token)
        .filter(|t| !t.is_empty());
    let refresh_token = from_body
        .or_else(|| jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| AppError::validation("validation.refresh_token_missing"))?;

    let session = state.baas.refresh(&refresh_token).await?;

    let jar = with_session_cookies(jar, &session, state.config.session.cookie_secure);
    Ok((jar, Json(session)))
}

/// Sign out and clear session cookies
#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    tag = "Authentication",
    responses(
        (status = 204, description = "Signed out")
    )
)]
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    if let Some(token) = extract_token(&headers) {
        // Tokens expire on their own; local sign-out proceeds regardless
        if let Err(e) = state.baas.sign_out(&token).await {
            warn!(error = %e, "Remote sign-out failed");
        }
    }

    (without_session_cookies(jar), StatusCode::NO_CONTENT)
}

/// Report the current session's lifetime for client polling
#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session status", body = SessionReport),
        (status = 401, description = "No session, or session expired")
    )
)]
pub async fn session(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Json<SessionReport> {
    let settings = &state.config.session;
    Json(SessionReport::new(
        current_user.expires_at,
        Utc::now(),
        Duration::seconds(settings.refresh_margin_seconds),
        Duration::seconds(settings.poll_interval_seconds),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AuthSession {
        AuthSession {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            user: None,
        }
    }

    #[test]
    fn session_cookies_are_http_only() {
        let jar = with_session_cookies(CookieJar::new(), &session(), true);
        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "access");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(jar.get(REFRESH_TOKEN_COOKIE).unwrap().value(), "refresh");
    }

    #[test]
    fn sign_out_removes_cookies() {
        let jar = with_session_cookies(CookieJar::new(), &session(), false);
        let jar = without_session_cookies(jar);
        assert!(jar.get(ACCESS_TOKEN_COOKIE).is_none());
        assert!(jar.get(REFRESH_TOKEN_COOKIE).is_none());
    }

    #[test]
    fn sign_up_requires_long_password() {
        let req = SignUpRequest {
            email: "staff@example.com".to_string(),
            password: "short".to_string(),
            display_name: "Kim".to_string(),
            locale: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
