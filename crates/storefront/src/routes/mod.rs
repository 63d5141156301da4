//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                  - Home page (product swimlane)
//! GET  /health                            - Health check
//!
//! # Products (also under /{language}-{country}/products)
//! GET  /products                          - Product listing
//! GET  /products/{id}                     - Product detail, options from query
//! POST /products/{id}/checkout            - Buy intent, redirects to checkout
//! GET  /products/{id}/incentive           - Current incentive offer (fragment)
//! POST /products/{id}/incentive/dismiss   - Dismiss offer, next offer (fragment)
//!
//! # Checkout
//! GET  /checkout/{variant_id}             - Direct checkout redirect
//! ```

pub mod checkout;
pub mod context;
pub mod home;
pub mod incentive;
pub mod products;
pub mod views;

use axum::{
    Router,
    extract::Request,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::rate_limit::RateLimiterLayer;
use crate::middleware::{
    anonymous_user_middleware, checkout_rate_limiter, create_session_layer,
    csp_nonce_middleware, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Create the product routes router.
///
/// Checkout is rate limited with the shared `limiter`.
pub fn product_routes(limiter: RateLimiterLayer) -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{product_id}", get(products::show))
        .route("/{product_id}/incentive", get(incentive::show))
        .route("/{product_id}/incentive/dismiss", post(incentive::dismiss))
        .merge(
            Router::new()
                .route("/{product_id}/checkout", post(checkout::buy))
                .route_layer(limiter),
        )
}

/// Create the direct checkout routes router.
pub fn checkout_routes(limiter: RateLimiterLayer) -> Router<AppState> {
    Router::new()
        .route("/{variant_id}", get(checkout::direct))
        .route_layer(limiter)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    let limiter = checkout_rate_limiter();

    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes(limiter.clone()))
        .nest("/{locale}/products", product_routes(limiter.clone()))
        // Direct checkout redirect
        .nest("/checkout", checkout_routes(limiter))
}

/// Build the full application with its middleware stack.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            anonymous_user_middleware,
        ))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(csp_nonce_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
