//! Session-related types.
//!
//! Types stored in the session for per-navigation visitor state.

use quickbuy_core::{IncentiveSequencer, ProductId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::services::analytics::ClickAttribution;

/// Session keys for visitor state.
pub mod keys {
    /// Key for the incentive modal state of the current product page.
    pub const INCENTIVE: &str = "incentive";

    /// Key for the product page the visitor last landed on.
    pub const LANDING: &str = "landing";
}

/// Incentive modal counter for one product page navigation.
///
/// A product page render starts a fresh state. A state recorded for another
/// product counts as fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveState {
    pub product_id: ProductId,
    pub sequencer: IncentiveSequencer,
}

impl IncentiveState {
    /// Fresh state for a new navigation to `product_id` (counter at zero).
    #[must_use]
    pub const fn begin(product_id: ProductId) -> Self {
        Self {
            product_id,
            sequencer: IncentiveSequencer::new(),
        }
    }

    /// This state if it belongs to `product_id`, otherwise a fresh one.
    #[must_use]
    pub fn for_product(stored: Option<Self>, product_id: ProductId) -> Self {
        stored
            .filter(|state| state.product_id == product_id)
            .unwrap_or_else(|| Self::begin(product_id))
    }

    /// Load the state for `product_id` from the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(
        session: &Session,
        product_id: ProductId,
    ) -> Result<Self, tower_sessions::session::Error> {
        let stored = session.get::<Self>(keys::INCENTIVE).await?;
        Ok(Self::for_product(stored, product_id))
    }

    /// Save the state to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn store(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(keys::INCENTIVE, self).await
    }
}

/// The product page a visitor landed on, with its ad attribution.
///
/// Checkout requests are form posts without the landing query string, so
/// their events reuse the page and click id recorded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingPage {
    pub product_id: ProductId,
    pub page: String,
    pub attribution: ClickAttribution,
}

impl LandingPage {
    /// Load the landing page recorded for `product_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(
        session: &Session,
        product_id: ProductId,
    ) -> Result<Option<Self>, tower_sessions::session::Error> {
        let stored = session.get::<Self>(keys::LANDING).await?;
        Ok(stored.filter(|landing| landing.product_id == product_id))
    }

    /// Save the landing page to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn store(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(keys::LANDING, self).await
    }
}
