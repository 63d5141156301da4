//! Application state shared across handlers.

use std::sync::Arc;

use quickbuy_core::IncentiveOffers;

use crate::config::StorefrontConfig;
use crate::services::analytics::AnalyticsDispatcher;
use crate::shopify::{Locale, StorefrontClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and replaces ambient globals:
/// every handler receives the Shopify client, the tracking queue, and the
/// offer table through it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    analytics: AnalyticsDispatcher,
}

impl AppState {
    /// Create a new application state.
    ///
    /// `analytics` is built separately so the caller owns the worker handle.
    #[must_use]
    pub fn new(config: StorefrontConfig, analytics: AnalyticsDispatcher) -> Self {
        let storefront = StorefrontClient::new(&config.shopify);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                analytics,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get a reference to the tracking event dispatcher.
    #[must_use]
    pub fn analytics(&self) -> &AnalyticsDispatcher {
        &self.inner.analytics
    }

    /// Get the incentive offer table.
    #[must_use]
    pub fn incentive_offers(&self) -> &IncentiveOffers {
        &self.inner.config.incentive_offers
    }

    /// Resolve the locale for an optional `{language}-{country}` segment.
    ///
    /// Returns `None` when a segment is present but is not a locale, so
    /// `/garbage/products/1` is not served as the default locale.
    #[must_use]
    pub fn resolve_locale(&self, segment: Option<&str>) -> Option<Locale> {
        match segment {
            None => Some(self.inner.config.default_locale.clone()),
            Some(segment) => Locale::from_segment(segment),
        }
    }
}
