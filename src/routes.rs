//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /r/{token}`   - Redirect page with scan logging (public)
//! - `POST /r/{token}/location` - Browser position for a scan (public)
//! - `GET  /health`      - Health check: DB, cache, scan queue (public)
//! - `/api/*`            - REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token on `/api`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{device_location_handler, health_handler, redirect_handler};
use crate::api::middleware::rate_limit::{self, ClientKey};
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// When `state.behind_proxy` is set, rate limiting keys clients by the
/// forwarding headers instead of the peer socket address; enable it only
/// behind a trusted reverse proxy.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let key = ClientKey::from_proxy_mode(state.behind_proxy);

    let api_router = rate_limit::secure(
        api::routes::protected_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer)),
        key,
    );

    let public_router = rate_limit::public(
        Router::new()
            .route("/r/{token}", get(redirect_handler))
            .route("/r/{token}/location", post(device_location_handler)),
        key,
    );

    let router = Router::new()
        .merge(public_router)
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
