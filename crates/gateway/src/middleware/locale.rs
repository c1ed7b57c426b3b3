//! Locale negotiation, page redirects and error localization.
//!
//! Runs outermost so that every response, including errors raised by the
//! auth and rate limit layers, is rendered in the caller's language.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE},
        HeaderValue, Request,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;

use common::ErrorReport;
use domain::{Locale, LOCALE_COOKIE};

use crate::state::AppState;

/// Path prefixes served by the API rather than the page router
const NON_PAGE_PREFIXES: &[&str] = &["/api", "/health", "/swagger-ui", "/api-docs"];

/// Cookie remembering the chosen locale. Readable by client scripts.
pub fn locale_cookie(locale: Locale, secure: bool) -> Cookie<'static> {
    Cookie::build((LOCALE_COOKIE, locale.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn has_prefix_segment(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .map(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(false)
}

/// Page paths are everything the API does not own, minus static assets.
pub(crate) fn is_page_path(path: &str) -> bool {
    if NON_PAGE_PREFIXES.iter().any(|p| has_prefix_segment(path, p)) {
        return false;
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    !last.contains('.')
}

/// Locale named by the first path segment, if any.
pub(crate) fn path_locale(path: &str) -> Option<Locale> {
    let first = path.trim_start_matches('/').split('/').next()?;
    Locale::ALL.into_iter().find(|l| l.as_str() == first)
}

/// `/{locale}{path}?{query}`
pub(crate) fn localized_location(locale: Locale, path: &str, query: Option<&str>) -> String {
    let path = if path == "/" { "" } else { path };
    match query {
        Some(q) if !q.is_empty() => format!("/{}{}?{}", locale, path, q),
        _ => format!("/{}{}", locale, path),
    }
}

/// Negotiate the request locale and localize the response.
pub async fn locale_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let cookie = jar.get(LOCALE_COOKIE).map(|c| c.value().to_string());
    let accept = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|h| h.to_str().ok());
    let negotiated = Locale::negotiate(cookie.as_deref(), accept, state.config.default_locale);

    let path = request.uri().path().to_string();
    let page = is_page_path(&path);
    let prefixed = path_locale(&path);

    if page && prefixed.is_none() {
        let location = localized_location(negotiated, &path, request.uri().query());
        return Redirect::temporary(&location).into_response();
    }

    let locale = prefixed.unwrap_or(negotiated);
    request.extensions_mut().insert(locale);

    let mut response = next.run(request).await;

    if let Some(report) = response.extensions().get::<ErrorReport>().cloned() {
        localize_error(&mut response, &report, locale);
    }

    if prefixed.is_some() && cookie.as_deref() != Some(locale.as_str()) {
        let cookie = locale_cookie(locale, state.config.session.cookie_secure);
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
        .headers_mut()
        .insert(CONTENT_LANGUAGE, HeaderValue::from_static(locale.as_str()));

    response
}

/// Re-render an error envelope in `locale`.
fn localize_error(response: &mut Response, report: &ErrorReport, locale: Locale) {
    match serde_json::to_vec(&report.envelope(locale)) {
        Ok(body) => {
            let headers = response.headers_mut();
            headers.remove(CONTENT_LENGTH);
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *response.body_mut() = Body::from(body);
        }
        Err(e) => warn!("Failed to localize error body: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_and_assets_are_not_pages() {
        assert!(!is_page_path("/api/stores"));
        assert!(!is_page_path("/api"));
        assert!(!is_page_path("/health"));
        assert!(!is_page_path("/swagger-ui/index.html"));
        assert!(!is_page_path("/api-docs/openapi.json"));
        assert!(!is_page_path("/favicon.ico"));
        assert!(is_page_path("/"));
        assert!(is_page_path("/stores/1/settings"));
        assert!(is_page_path("/apiary"));
    }

    #[test]
    fn first_segment_names_locale() {
        assert_eq!(path_locale("/ja/stores"), Some(Locale::Ja));
        assert_eq!(path_locale("/en"), Some(Locale::En));
        assert_eq!(path_locale("/EN/stores"), None);
        assert_eq!(path_locale("/stores"), None);
        assert_eq!(path_locale("/"), None);
    }

    #[test]
    fn location_keeps_path_and_query() {
        assert_eq!(localized_location(Locale::En, "/", None), "/en");
        assert_eq!(
            localized_location(Locale::Ko, "/stores/1", Some("tab=hours")),
            "/ko/stores/1?tab=hours"
        );
        assert_eq!(localized_location(Locale::Ja, "/stores", Some("")), "/ja/stores");
    }

    #[test]
    fn locale_cookie_is_site_wide() {
        let cookie = locale_cookie(Locale::Ja, false);
        assert_eq!(cookie.name(), LOCALE_COOKIE);
        assert_eq!(cookie.value(), "ja");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), None);
    }
}
