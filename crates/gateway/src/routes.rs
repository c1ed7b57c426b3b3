//! Route configuration.

use axum::{
    http::{
        header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    audit_routes, auth_routes, break_rule_routes, business_hour_routes, get_locale, get_me,
    health_routes, holiday_routes, invitee_routes, job_role_routes, member_routes,
    page_fallback, public_invitation_routes, session_routes, set_locale, staffing_target_routes,
    store_invitation_routes, store_routes, work_item_routes,
};
use crate::middleware::{
    auth_middleware, locale_middleware, rate_limit_auth_middleware, rate_limit_middleware,
};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_api(&state))
        .merge(protected_api(&state));

    let mut router = Router::new()
        // Health check (no auth, no rate limit)
        .nest("/health", health_routes())
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        // Localized pages and unknown paths
        .fallback(page_fallback)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(&state.config.cors_allowed_origins) {
        router = router.layer(cors);
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), locale_middleware))
        .with_state(state)
}

/// Routes reachable without a session.
fn public_api(state: &AppState) -> Router<AppState> {
    Router::new()
        // Sign-in and sign-up get the stricter limit
        .nest(
            "/auth",
            auth_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth_middleware,
            )),
        )
        .nest("/invitations", public_invitation_routes())
        .route("/locale", get(get_locale).put(set_locale))
}

/// Routes that need a verified access token (general rate limit).
fn protected_api(state: &AppState) -> Router<AppState> {
    let stores = store_routes()
        .merge(member_routes())
        .merge(store_invitation_routes())
        .merge(business_hour_routes())
        .merge(holiday_routes())
        .merge(break_rule_routes())
        .merge(work_item_routes())
        .merge(staffing_target_routes())
        .merge(job_role_routes())
        .merge(audit_routes());

    Router::new()
        .nest("/auth", session_routes())
        .nest("/stores", stores)
        .nest("/invitations", invitee_routes())
        .route("/me", get(get_me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
}

/// CORS for the configured origins; `None` when no origin is allowed.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT_LANGUAGE])
            .allow_credentials(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_needs_a_valid_origin() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_none());
        assert!(cors_layer(&["https://app.workeasy.example".to_string()]).is_some());
    }
}
