//! Authentication middleware.
//!
//! Access tokens are issued by the hosted auth provider and verified here
//! with the project's shared secret, so no network call is needed per request.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{ACCESS_TOKEN_COOKIE, BEARER_TOKEN_PREFIX, TOKEN_AUDIENCE};

use crate::clients::Caller;
use crate::state::AppState;

/// Claims carried by a BaaS access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration (unix seconds)
    pub exp: i64,
    /// Database role the token runs as (`authenticated`)
    #[serde(default)]
    pub role: Option<String>,
}

/// HS256 verifier for access tokens.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a token; an expired one is reported as `SessionExpired`.
    pub fn verify(&self, token: &str) -> AppResult<AccessClaims> {
        match decode::<AccessClaims>(token, &self.key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                Err(AppError::SessionExpired)
            }
            Err(e) => Err(AppError::Jwt(e)),
        }
    }
}

/// Current authenticated user extracted from the access token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: Option<String>,
    /// Raw token, forwarded so row-level security sees the same user
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CurrentUser {
    fn from_claims(claims: AccessClaims, access_token: String) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            access_token,
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
        }
    }

    /// BaaS identity for calls made on this user's behalf.
    pub fn caller(&self) -> Caller {
        Caller::user(self.access_token.clone())
    }
}

/// Authentication middleware that validates access tokens.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let claims = state.tokens.verify(&token)?;

    request
        .extensions_mut()
        .insert(CurrentUser::from_claims(claims, token));

    Ok(next.run(request).await)
}

/// Bearer token from the Authorization header, else the access token cookie.
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}
