//! Tracking event payload.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shopify::{Product, ProductVariant, Shop};

/// Source reported for traffic without an ad click id.
pub const WEB_SOURCE: &str = "web";

/// Events reported to the tracking endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventName {
    /// Product page rendered.
    ViewContent,
    /// Checkout session created, about to redirect.
    InitiateCheckout,
    /// Incentive modal dismissed via browser back.
    #[serde(rename = "_BtnBack")]
    BackButton,
}

/// Where the visitor came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickAttribution {
    /// `web`, or the ad platform when a click id is present.
    pub source: String,
    /// Ad click id from the landing URL.
    pub cid: Option<String>,
}

impl Default for ClickAttribution {
    fn default() -> Self {
        Self {
            source: WEB_SOURCE.to_string(),
            cid: None,
        }
    }
}

impl ClickAttribution {
    /// Attribute a visit from its query parameters.
    ///
    /// A non-empty `param` value marks the visit as coming from
    /// `click_source`.
    #[must_use]
    pub fn from_query(query: &HashMap<String, String>, param: &str, click_source: &str) -> Self {
        query
            .get(param)
            .map(|cid| cid.trim())
            .filter(|cid| !cid.is_empty())
            .map_or_else(Self::default, |cid| Self {
                source: click_source.to_string(),
                cid: Some(cid.to_string()),
            })
    }
}

/// Per-request visitor context shared by every event of a request.
#[derive(Debug, Clone)]
pub struct EventContext {
    /// Anonymous browser id from the `_user_id` cookie.
    pub user_id: Uuid,
    /// Full page URL.
    pub page: String,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub attribution: ClickAttribution,
}

/// One tracking event, serialized as the endpoint's camelCase JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub source: String,
    /// Shop primary domain host.
    pub shop: String,
    pub event: EventName,
    /// Fresh per event, for de-duplication by the receiver.
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub cid: Option<String>,
    pub ua: Option<String>,
    pub ip: Option<String>,
    pub page: String,
    pub product_id: u64,
    pub product_variant_id: Option<u64>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub product_price: Option<Decimal>,
    pub product_currency: Option<String>,
    pub product_name: String,
    pub product_description: String,
    pub checkout_id: Option<String>,
    pub discount_code: Option<String>,
}

impl AnalyticsEvent {
    /// Build a product event for the variant the visitor is looking at.
    #[must_use]
    pub fn for_product(
        event: EventName,
        context: &EventContext,
        shop: &Shop,
        product: &Product,
        variant: Option<&ProductVariant>,
    ) -> Self {
        Self {
            source: context.attribution.source.clone(),
            shop: shop.primary_domain.host.clone(),
            event,
            event_id: Uuid::new_v4(),
            user_id: context.user_id,
            cid: context.attribution.cid.clone(),
            ua: context.user_agent.clone(),
            ip: context.ip.clone(),
            page: context.page.clone(),
            product_id: product.id.as_u64(),
            product_variant_id: variant.map(|v| v.id.as_u64()),
            product_price: variant.map(|v| v.price.amount),
            product_currency: variant.map(|v| v.price.currency_code.clone()),
            product_name: product.title.clone(),
            product_description: product.description.clone(),
            checkout_id: None,
            discount_code: None,
        }
    }

    /// Attach the checkout session and the discount code it carries.
    #[must_use]
    pub fn with_checkout(mut self, checkout_id: &str, discount_code: Option<&str>) -> Self {
        self.checkout_id = Some(checkout_id.to_string());
        self.discount_code = discount_code.map(ToString::to_string);
        self
    }
}
