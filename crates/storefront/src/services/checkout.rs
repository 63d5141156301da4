//! Checkout hand-off: create a one-line checkout, optionally attach a
//! discount code, redirect to Shopify's hosted checkout.
//!
//! Discount application only ever runs after creation succeeded, and only
//! for a non-empty code. Nothing is retried; any failed call aborts the
//! attempt and the buyer re-initiates it.

use axum::response::Redirect;
use quickbuy_core::VariantId;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::error::add_breadcrumb;
use crate::shopify::{CheckoutSession, DiscountApplication, Locale, ShopifyError, StorefrontClient};

/// Every checkout session holds exactly one unit of one variant.
pub const CHECKOUT_QUANTITY: u32 = 1;

/// Errors aborting a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Creating the checkout session failed.
    #[error("checkout creation failed: {0}")]
    Create(#[source] ShopifyError),

    /// Attaching the discount code failed.
    #[error("discount application failed: {0}")]
    Discount(#[source] ShopifyError),
}

/// A created checkout, ready to redirect to.
#[derive(Debug, Clone)]
pub struct CheckoutHandoff {
    pub session: CheckoutSession,
    /// The discount code sent to Shopify, with Shopify's verdict.
    pub discount: Option<DiscountApplication>,
}

impl CheckoutHandoff {
    /// The discount code attached to the session, if any.
    #[must_use]
    pub fn discount_code(&self) -> Option<&str> {
        self.discount.as_ref().map(|d| d.code.as_str())
    }

    /// Redirect to the hosted checkout.
    #[must_use]
    pub fn redirect(&self) -> Redirect {
        redirect_to_hosted_checkout(&self.session)
    }
}

/// Runs the checkout steps against the Storefront API.
#[derive(Clone, Copy)]
pub struct CheckoutOrchestrator<'a> {
    storefront: &'a StorefrontClient,
}

impl<'a> CheckoutOrchestrator<'a> {
    #[must_use]
    pub const fn new(storefront: &'a StorefrontClient) -> Self {
        Self { storefront }
    }

    /// Create a checkout session for one unit of `variant`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Create` if the remote call fails or returns
    /// no session.
    #[instrument(skip(self), fields(variant_id = %variant))]
    pub async fn create_checkout_session(
        &self,
        variant: VariantId,
        locale: &Locale,
    ) -> Result<CheckoutSession, CheckoutError> {
        let variant_id = variant.to_string();
        add_breadcrumb(
            "checkout",
            "Creating checkout session",
            Some(&[("variant_id", variant_id.as_str())]),
        );

        let session = self
            .storefront
            .create_checkout(variant, CHECKOUT_QUANTITY, locale)
            .await
            .map_err(CheckoutError::Create)?;

        info!(checkout_id = %session.id, "Checkout session created");
        Ok(session)
    }

    /// Attach `code` to the session. Empty or missing codes make no call.
    ///
    /// Shopify's `applicable` verdict is logged, not enforced.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Discount` if the remote call fails.
    #[instrument(skip(self, session), fields(checkout_id = %session.id))]
    pub async fn apply_discount(
        &self,
        session: &CheckoutSession,
        code: Option<&str>,
    ) -> Result<Option<DiscountApplication>, CheckoutError> {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(None);
        };

        add_breadcrumb(
            "checkout",
            "Applying discount code",
            Some(&[("checkout_id", session.id.as_str()), ("code", code)]),
        );

        let applied = self
            .storefront
            .update_discount_codes(&session.handle, code)
            .await
            .map_err(CheckoutError::Discount)?;

        if applied.applicable {
            info!(code = %applied.code, "Discount code applied");
        } else {
            warn!(code = %applied.code, "Discount code not applicable to checkout");
        }

        Ok(Some(applied))
    }

    /// Create a session, then attach `code` when present.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's `CheckoutError`.
    pub async fn begin(
        &self,
        variant: VariantId,
        code: Option<&str>,
        locale: &Locale,
    ) -> Result<CheckoutHandoff, CheckoutError> {
        let session = self.create_checkout_session(variant, locale).await?;
        let discount = self.apply_discount(&session, code).await?;
        Ok(CheckoutHandoff { session, discount })
    }
}

/// `303 See Other` to the hosted checkout URL.
#[must_use]
pub fn redirect_to_hosted_checkout(session: &CheckoutSession) -> Redirect {
    Redirect::to(session.checkout_url.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use secrecy::SecretString;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ShopifyStorefrontConfig;

    fn client_for(server: &MockServer) -> StorefrontClient {
        StorefrontClient::new(&ShopifyStorefrontConfig {
            store: "test.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            storefront_private_token: SecretString::from("shpat_test_token"),
            endpoint_override: Some(Url::parse(&format!("{}/graphql", server.uri())).unwrap()),
            variant_page_size: 250,
        })
    }

    async fn mount_cart_create(server: &MockServer) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "CartCreate"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"cartCreate": {
                    "cart": {
                        "id": "gid://shopify/Cart/c1-token?key=secret",
                        "checkoutUrl": "https://quick.example.test/cart/c/c1-token?key=secret"
                    },
                    "userErrors": []
                }}
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_discount(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "CartDiscountCodesUpdate"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"cartDiscountCodesUpdate": {
                    "cart": {
                        "id": "gid://shopify/Cart/c1-token?key=secret",
                        "discountCodes": [{"code": "ABC5", "applicable": true}]
                    },
                    "userErrors": []
                }}
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_session_url_ends_in_session_token() {
        let server = MockServer::start().await;
        mount_cart_create(&server).await;
        let client = client_for(&server);

        let session = CheckoutOrchestrator::new(&client)
            .create_checkout_session(VariantId::new(5), &Locale::new("en", "us"))
            .await
            .unwrap();

        let last_segment = session.checkout_url.path_segments().unwrap().next_back();
        assert_eq!(last_segment, Some(session.id.as_str()));
        assert!(session.handle.contains(&session.id));
    }

    #[tokio::test]
    async fn test_empty_code_skips_discount_call() {
        let server = MockServer::start().await;
        mount_cart_create(&server).await;
        mount_discount(&server, 0).await;
        let client = client_for(&server);

        let handoff = CheckoutOrchestrator::new(&client)
            .begin(VariantId::new(5), Some(""), &Locale::new("en", "us"))
            .await
            .unwrap();

        assert!(handoff.discount.is_none());
        assert_eq!(handoff.discount_code(), None);
    }

    #[tokio::test]
    async fn test_missing_code_skips_discount_call() {
        let server = MockServer::start().await;
        mount_cart_create(&server).await;
        mount_discount(&server, 0).await;
        let client = client_for(&server);

        let handoff = CheckoutOrchestrator::new(&client)
            .begin(VariantId::new(5), None, &Locale::new("en", "us"))
            .await
            .unwrap();

        assert!(handoff.discount.is_none());
    }

    #[tokio::test]
    async fn test_code_is_applied_after_creation() {
        let server = MockServer::start().await;
        mount_cart_create(&server).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "CartDiscountCodesUpdate",
                "variables": {
                    "cartId": "gid://shopify/Cart/c1-token?key=secret",
                    "discountCodes": ["ABC5"]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"cartDiscountCodesUpdate": {
                    "cart": {"id": "gid://shopify/Cart/c1-token?key=secret", "discountCodes": [{"code": "ABC5", "applicable": true}]},
                    "userErrors": []
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server);

        let handoff = CheckoutOrchestrator::new(&client)
            .begin(VariantId::new(5), Some("ABC5"), &Locale::new("en", "us"))
            .await
            .unwrap();

        assert_eq!(handoff.discount_code(), Some("ABC5"));
        assert!(handoff.discount.unwrap().applicable);
    }

    #[tokio::test]
    async fn test_creation_failure_skips_discount() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "CartCreate"})))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;
        mount_discount(&server, 0).await;
        let client = client_for(&server);

        let result = CheckoutOrchestrator::new(&client)
            .begin(VariantId::new(5), Some("TT20"), &Locale::new("en", "us"))
            .await;

        assert!(matches!(result, Err(CheckoutError::Create(_))));
    }

    #[test]
    fn test_redirect_is_see_other() {
        let session = CheckoutSession::from_cart(
            "gid://shopify/Cart/t1",
            "https://quick.example.test/cart/c/t1",
        )
        .unwrap();

        let response = redirect_to_hosted_checkout(&session).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()["location"],
            "https://quick.example.test/cart/c/t1"
        );
    }
}
