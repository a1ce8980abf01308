//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppEnv;
use crate::kernel::ServerDeps;
use crate::server::cookies::SessionCookie;
use crate::server::middleware::{extract_client_ip, require_admin, session_auth_middleware};
use crate::server::routes::{
    admin_login_handler, health_handler, list_logs_handler, logout_handler, me_handler,
    send_otp_handler, verify_otp_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub session_cookie: SessionCookie,
}

impl AppState {
    pub fn new(deps: Arc<ServerDeps>, app_env: AppEnv) -> Self {
        let session_cookie = SessionCookie::for_env(app_env, deps.jwt_service.ttl());
        Self {
            deps,
            session_cookie,
        }
    }
}

/// Routes and request-scoped middleware, without the network-facing layers.
///
/// Router tests drive this directly with `oneshot`.
pub fn build_router(state: AppState) -> Router {
    let jwt_service = state.deps.jwt_service.clone();

    Router::new()
        // Admin-only
        .route("/admin/logs", get(list_logs_handler))
        .route_layer(middleware::from_fn(require_admin))
        // Public
        .route("/auth/send-otp", post(send_otp_handler))
        .route("/auth/verify-otp", post(verify_otp_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler))
        .route("/admin/login", post(admin_login_handler))
        .route("/admin/logout", post(logout_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            session_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(middleware::from_fn(extract_client_ip))
        .layer(Extension(state))
}

/// Full application: routes plus per-IP throttling, CORS and request tracing
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    // Per-IP throttle in front of every route: one token per second, bursts of 30
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(1)
            .burst_size(30)
            .use_headers() // Extract IP from X-Forwarded-For header
            .finish()
            .context("Invalid rate limiter configuration")?,
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    // Cookies need credentials, which rules out wildcard origins
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    Ok(build_router(state)
        .layer(rate_limit_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}
