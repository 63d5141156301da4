//! Quickbuy Storefront - single-product quick-buy site.
//!
//! This binary serves the public-facing storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework with a small nonce-guarded inline script
//! - Askama templates for server-side rendering
//! - Shopify Storefront API for products and checkout creation
//! - Bounded background queue for ad-tracking events
//!
//! # Security
//!
//! This binary only has access to:
//! - Shopify Storefront API (private access token)
//! - The configured tracking endpoint
//!
//! It keeps no database; visitor sessions live in memory.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use quickbuy_storefront::config::StorefrontConfig;
use quickbuy_storefront::routes;
use quickbuy_storefront::services::analytics::{AnalyticsDispatcher, TrackingClient};
use quickbuy_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quickbuy_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Tracking queue: a worker owns the receiver until every sender drops
    let (analytics, worker) = match &config.analytics.tracking_endpoint {
        Some(endpoint) => {
            let (dispatcher, worker) = AnalyticsDispatcher::spawn(
                TrackingClient::new(endpoint.clone()),
                config.analytics.queue_capacity,
            );
            tracing::info!(
                endpoint = %endpoint,
                capacity = config.analytics.queue_capacity,
                "Tracking enabled"
            );
            (dispatcher, Some(worker))
        }
        None => {
            tracing::warn!("TRACKING_ENDPOINT not set, tracking events are dropped");
            (AnalyticsDispatcher::disabled(), None)
        }
    };

    let addr = config.socket_addr();
    let state = AppState::new(config, analytics);
    let app = routes::app(state);

    // Start server
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // The router (and its senders) dropped with the server; drain the queue
    if let Some(worker) = worker {
        if let Err(e) = worker.await {
            tracing::error!(error = %e, "Tracking worker panicked");
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
