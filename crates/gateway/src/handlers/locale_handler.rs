//! Locale preference and page fallback handlers.

use axum::{
    extract::{Extension, State},
    http::Uri,
    response::Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use common::{AppError, AppResult};
use domain::Locale;

use crate::extractors::ValidatedJson;
use crate::middleware::locale_cookie;
use crate::state::AppState;

/// Locale change request
#[derive(Debug, Deserialize, validator::Validate, ToSchema)]
pub struct SetLocaleRequest {
    /// One of `ko`, `en`, `ja`
    #[schema(example = "en")]
    pub locale: String,
}

/// Locale in effect
#[derive(Debug, Serialize, ToSchema)]
pub struct LocaleResponse {
    pub locale: Locale,
    pub available: Vec<Locale>,
}

/// What the page router resolved for a localized path
#[derive(Debug, Serialize, ToSchema)]
pub struct PageContext {
    pub locale: Locale,
    /// Path with the locale prefix removed
    pub path: String,
}

/// Remember a locale choice
#[utoipa::path(
    put,
    path = "/api/locale",
    tag = "Locale",
    request_body = SetLocaleRequest,
    responses(
        (status = 200, description = "Locale cookie set", body = LocaleResponse),
        (status = 400, description = "Unsupported locale")
    )
)]
pub async fn set_locale(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<SetLocaleRequest>,
) -> AppResult<(CookieJar, Json<LocaleResponse>)> {
    let locale: Locale = payload
        .locale
        .trim()
        .parse()
        .map_err(|_| AppError::validation("validation.locale_unsupported"))?;

    let jar = jar.add(locale_cookie(locale, state.config.session.cookie_secure));
    Ok((
        jar,
        Json(LocaleResponse {
            locale,
            available: Locale::ALL.to_vec(),
        }),
    ))
}

/// Locale negotiated for this request
#[utoipa::path(
    get,
    path = "/api/locale",
    tag = "Locale",
    responses(
        (status = 200, description = "Negotiated locale", body = LocaleResponse)
    )
)]
pub async fn get_locale(Extension(locale): Extension<Locale>) -> Json<LocaleResponse> {
    Json(LocaleResponse {
        locale,
        available: Locale::ALL.to_vec(),
    })
}

/// Fallback for everything no API route matched. Localized page paths
/// resolve to a page context; anything else is not found.
pub async fn page_fallback(
    uri: Uri,
    locale: Option<Extension<Locale>>,
) -> AppResult<Json<PageContext>> {
    let path = uri.path();
    let Some(Extension(locale)) = locale else {
        return Err(AppError::NotFound);
    };

    let prefix = format!("/{}", locale);
    match path.strip_prefix(&prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => Ok(Json(PageContext {
            locale,
            path: if rest.is_empty() { "/".to_string() } else { rest.to_string() },
        })),
        _ => Err(AppError::NotFound),
    }
}
