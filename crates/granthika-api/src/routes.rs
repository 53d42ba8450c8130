// ============================================================================
// Granthika API - Router
// File: crates/granthika-api/src/routes.rs
// ============================================================================

use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers::{auth, dashboard, health, settings};
use crate::state::AppState;

pub mod paths {
    pub const SIGN_IN: &str = "/accounts/sign_in";
    pub const SIGN_UP: &str = "/accounts/sign_up";
    pub const LOGOUT: &str = "/accounts/logout";
    pub const FORGET_PASSWORD: &str = "/accounts/forget_password";
    pub const DASHBOARD: &str = "/accounts/admin_dashboard";
    pub const SETTINGS: &str = "/accounts/settings";
    pub const HEALTH: &str = "/health";
}

pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let account_routes = Router::new()
        .route(paths::SIGN_IN, get(auth::form_page).post(auth::sign_in))
        .route(paths::SIGN_UP, get(auth::form_page).post(auth::sign_up))
        .route(paths::FORGET_PASSWORD, get(auth::form_page).post(auth::forget_password))
        .route(paths::LOGOUT, post(auth::logout))
        .route(paths::DASHBOARD, get(dashboard::admin_dashboard))
        .route(paths::SETTINGS, get(settings::settings_page).post(settings::update_settings));

    Router::new()
        .route(paths::HEALTH, get(health::health_check))
        .merge(account_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
                .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
