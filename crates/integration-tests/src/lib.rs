//! Integration tests for the Quickbuy storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p quickbuy-integration-tests
//! ```
//!
//! Each test drives the real router in-process with `tower::ServiceExt::oneshot`.
//! The Shopify Storefront API and the tracking endpoint are `wiremock` servers,
//! so no network access or credentials are needed.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use quickbuy_core::IncentiveOffers;
use quickbuy_storefront::config::{
    AnalyticsConfig, DEFAULT_MAX_SESSIONS, ShopifyStorefrontConfig, StorefrontConfig,
};
use quickbuy_storefront::routes;
use quickbuy_storefront::services::analytics::{AnalyticsDispatcher, TrackingClient};
use quickbuy_storefront::shopify::Locale;
use quickbuy_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Product id served by [`product_page_body`].
pub const PRODUCT_ID: u64 = 42;

/// Product id the catalog reports as missing.
pub const MISSING_PRODUCT_ID: u64 = 999;

/// Hosted checkout URL returned by [`mount_cart_create`].
pub const CHECKOUT_URL: &str = "https://quick.example.test/cart/c/tok42?key=k";

/// Client address sent on every request (the checkout rate limiter keys on it).
const CLIENT_IP: &str = "203.0.113.10";

/// A storefront wired to mock collaborators.
pub struct TestStorefront {
    pub shopify: MockServer,
    pub tracking: MockServer,
    app: Router,
}

/// Storefront configuration pointing at the mock servers.
///
/// # Panics
///
/// Panics if a mock server URI is not a valid URL.
#[must_use]
pub fn test_config(shopify: &MockServer, tracking: &MockServer) -> StorefrontConfig {
    let endpoint = |server: &MockServer, path: &str| {
        Url::parse(&format!("{}{path}", server.uri())).expect("mock server uri is a url")
    };

    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: Url::parse("http://storefront.test").expect("static url"),
        shopify: ShopifyStorefrontConfig {
            store: "quick.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            storefront_private_token: SecretString::from("shpat_integration_token"),
            endpoint_override: Some(endpoint(shopify, "/graphql")),
            variant_page_size: 250,
        },
        default_locale: Locale::new("en", "us"),
        analytics: AnalyticsConfig {
            tracking_endpoint: Some(endpoint(tracking, "/events")),
            ..AnalyticsConfig::default()
        },
        incentive_offers: IncentiveOffers::default(),
        max_sessions: DEFAULT_MAX_SESSIONS,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

impl TestStorefront {
    /// Start mock servers, mount the catalog and tracking mocks, build the app.
    pub async fn start() -> Self {
        let shopify = MockServer::start().await;
        let tracking = MockServer::start().await;

        mount_product_page(&shopify).await;
        mount_missing_product(&shopify).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&tracking)
            .await;

        let config = test_config(&shopify, &tracking);
        let (dispatcher, _worker) = AnalyticsDispatcher::spawn(
            TrackingClient::new(
                config
                    .analytics
                    .tracking_endpoint
                    .clone()
                    .expect("tracking endpoint is configured"),
            ),
            config.analytics.queue_capacity,
        );
        let app = routes::app(AppState::new(config, dispatcher));

        Self {
            shopify,
            tracking,
            app,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        let Ok(response) = self.app.clone().oneshot(request).await;
        response
    }

    /// `GET uri`, sending `cookies` when given.
    pub async fn get(&self, uri: &str, cookies: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(uri).header("x-forwarded-for", CLIENT_IP);
        if let Some(cookies) = cookies {
            builder = builder.header(header::COOKIE, cookies);
        }
        self.send(builder.body(Body::empty()).expect("valid request"))
            .await
    }

    /// `POST uri` with a urlencoded `form` body.
    pub async fn post_form(&self, uri: &str, form: &str, cookies: Option<&str>) -> Response<Body> {
        let mut builder = Request::post(uri)
            .header("x-forwarded-for", CLIENT_IP)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookies) = cookies {
            builder = builder.header(header::COOKIE, cookies);
        }
        self.send(
            builder
                .body(Body::from(form.to_string()))
                .expect("valid request"),
        )
        .await
    }

    /// Tracking events received so far, waiting until at least `expected`
    /// have arrived (or about two seconds have passed).
    pub async fn tracked_events(&self, expected: usize) -> Vec<Value> {
        for _ in 0..100 {
            let received = self.tracking.received_requests().await.unwrap_or_default();
            if received.len() >= expected {
                return received
                    .iter()
                    .filter_map(|request| request.body_json::<Value>().ok())
                    .collect();
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        Vec::new()
    }
}

/// Catalog response for product 42: sizes S, M (available) and L (sold out).
#[must_use]
pub fn product_page_body() -> Value {
    let variant = |id: u64, size: &str, available: bool| {
        json!({
            "id": format!("gid://shopify/ProductVariant/{id}"),
            "title": size,
            "availableForSale": available,
            "sku": format!("TEE-{size}"),
            "selectedOptions": [{"name": "Size", "value": size}],
            "image": null,
            "price": {"amount": "19.90", "currencyCode": "USD"},
            "compareAtPrice": {"amount": "29.90", "currencyCode": "USD"}
        })
    };

    json!({
        "data": {
            "product": {
                "id": format!("gid://shopify/Product/{PRODUCT_ID}"),
                "handle": "quick-tee",
                "title": "Quick Tee",
                "vendor": "Quick",
                "description": "A very quick tee",
                "descriptionHtml": "<p>A very quick tee</p>",
                "options": [{"name": "Size", "optionValues": [{"name": "S"}, {"name": "M"}, {"name": "L"}]}],
                "media": {"nodes": [{"image": {
                    "url": "https://cdn.shopify.com/s/files/tee.jpg",
                    "altText": "Quick Tee",
                    "width": 800,
                    "height": 800
                }}]},
                "variants": {"nodes": [
                    variant(1, "S", true),
                    variant(2, "M", true),
                    variant(3, "L", false)
                ]},
                "seo": {"title": null, "description": null}
            },
            "shop": {
                "name": "Quick Shop",
                "primaryDomain": {"url": "https://quick.example.test", "host": "quick.example.test"},
                "shippingPolicy": {"handle": "shipping-policy", "body": "<p>Ships in 2 days</p>"},
                "refundPolicy": null
            }
        }
    })
}

/// Serve [`product_page_body`] for every `ProductPage` query.
pub async fn mount_product_page(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"operationName": "ProductPage"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page_body()))
        .mount(server)
        .await;
}

/// Answer `ProductPage` for [`MISSING_PRODUCT_ID`] with `product: null`.
///
/// Mounted ahead of [`mount_product_page`] so it wins for that id.
pub async fn mount_missing_product(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "ProductPage",
            "variables": {"id": format!("gid://shopify/Product/{MISSING_PRODUCT_ID}")}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "product": null,
                "shop": {
                    "name": "Quick Shop",
                    "primaryDomain": {"url": "https://quick.example.test", "host": "quick.example.test"},
                    "shippingPolicy": null,
                    "refundPolicy": null
                }
            }
        })))
        .with_priority(1)
        .mount(server)
        .await;
}

/// Expect exactly `expected_calls` `CartCreate` mutations.
pub async fn mount_cart_create(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"operationName": "CartCreate"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"cartCreate": {
                "cart": {"id": "gid://shopify/Cart/tok42?key=k", "checkoutUrl": CHECKOUT_URL},
                "userErrors": []
            }}
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Expect exactly `expected_calls` discount updates carrying `code`.
pub async fn mount_discount_update(server: &MockServer, code: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "CartDiscountCodesUpdate",
            "variables": {"discountCodes": [code]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"cartDiscountCodesUpdate": {
                "cart": {
                    "id": "gid://shopify/Cart/tok42?key=k",
                    "discountCodes": [{"code": code, "applicable": true}]
                },
                "userErrors": []
            }}
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Expect no discount update at all.
pub async fn forbid_discount_update(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"operationName": "CartDiscountCodesUpdate"})))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

/// `name=value` pairs from a response's `Set-Cookie` headers, joined for a
/// `Cookie` request header.
#[must_use]
pub fn cookies_from(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Merge two cookie headers, later values replacing earlier ones.
#[must_use]
pub fn merge_cookies(earlier: &str, later: &str) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for pair in earlier.split("; ").chain(later.split("; ")) {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        pairs.retain(|(existing, _)| existing != name);
        pairs.push((name.to_string(), value.to_string()));
    }
    pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read a response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8_lossy(&bytes).into_owned()
}
