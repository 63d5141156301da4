//! Buy intent, incentive dismissals, and the checkout hand-off.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use quickbuy_integration_tests::{
    CHECKOUT_URL, MISSING_PRODUCT_ID, PRODUCT_ID, TestStorefront, body_text, cookies_from,
    forbid_discount_update, merge_cookies, mount_cart_create, mount_discount_update,
};

/// Land on the product page and return the browser's cookies.
async fn land(storefront: &TestStorefront, query: &str) -> String {
    let response = storefront
        .get(&format!("/products/{PRODUCT_ID}{query}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    cookies_from(&response)
}

async fn dismiss(storefront: &TestStorefront, cookies: &str) -> String {
    let response = storefront
        .post_form(
            &format!("/products/{PRODUCT_ID}/incentive/dismiss"),
            "variant_id=1",
            Some(cookies),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = merge_cookies(cookies, &cookies_from(&response));
    let _ = body_text(response).await;
    cookies
}

#[tokio::test]
async fn test_checkout_without_dismissal_skips_discount() {
    let storefront = TestStorefront::start().await;
    mount_cart_create(&storefront.shopify, 1).await;
    forbid_discount_update(&storefront.shopify).await;

    let cookies = land(&storefront, "?ttclid=click-9").await;
    let response = storefront
        .post_form(
            &format!("/products/{PRODUCT_ID}/checkout"),
            "variant_id=2",
            Some(&cookies),
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], CHECKOUT_URL);

    let events = storefront.tracked_events(2).await;
    let checkout = events
        .iter()
        .find(|e| e["event"] == "InitiateCheckout")
        .unwrap();
    assert_eq!(checkout["checkoutId"], "tok42");
    assert!(checkout["discountCode"].is_null());
    assert_eq!(checkout["productVariantId"], 2);
    // Attribution comes from the landing page
    assert_eq!(checkout["cid"], "click-9");
    assert_eq!(
        checkout["page"],
        "http://storefront.test/products/42?ttclid=click-9"
    );
}

#[tokio::test]
async fn test_dismissals_raise_the_discount_code() {
    let storefront = TestStorefront::start().await;
    mount_cart_create(&storefront.shopify, 1).await;
    mount_discount_update(&storefront.shopify, "TT20", 1).await;

    let cookies = land(&storefront, "").await;
    let cookies = dismiss(&storefront, &cookies).await;
    let cookies = dismiss(&storefront, &cookies).await;

    let modal = body_text(
        storefront
            .get(
                &format!("/products/{PRODUCT_ID}/incentive"),
                Some(&cookies),
            )
            .await,
    )
    .await;
    assert!(modal.contains("$20 CASH BONUS"));
    assert!(modal.contains("Claim Now!"));

    let response = storefront
        .post_form(
            &format!("/products/{PRODUCT_ID}/checkout"),
            "variant_id=1",
            Some(&cookies),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let events = storefront.tracked_events(4).await;
    let names: Vec<_> = events.iter().map(|e| e["event"].clone()).collect();
    assert_eq!(
        names,
        vec!["ViewContent", "_BtnBack", "_BtnBack", "InitiateCheckout"]
    );
    assert_eq!(events[3]["discountCode"], "TT20");
}

#[tokio::test]
async fn test_one_dismissal_offers_second_tier() {
    let storefront = TestStorefront::start().await;
    mount_cart_create(&storefront.shopify, 1).await;
    mount_discount_update(&storefront.shopify, "ABC5", 1).await;

    let cookies = land(&storefront, "").await;
    let cookies = dismiss(&storefront, &cookies).await;

    let modal = body_text(
        storefront
            .get(
                &format!("/products/{PRODUCT_ID}/incentive"),
                Some(&cookies),
            )
            .await,
    )
    .await;
    assert!(modal.contains("$5 CASH GIFT"));

    let response = storefront
        .post_form(
            &format!("/products/{PRODUCT_ID}/checkout"),
            "variant_id=1",
            Some(&cookies),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_failed_dismissal_keeps_earned_offer() {
    let storefront = TestStorefront::start().await;
    mount_cart_create(&storefront.shopify, 1).await;
    mount_discount_update(&storefront.shopify, "ABC5", 1).await;

    let cookies = land(&storefront, "").await;
    let cookies = dismiss(&storefront, &cookies).await;

    let failed = storefront
        .post_form(
            &format!("/products/{MISSING_PRODUCT_ID}/incentive/dismiss"),
            "variant_id=1",
            Some(&cookies),
        )
        .await;
    assert_eq!(failed.status(), StatusCode::NOT_FOUND);
    let cookies = merge_cookies(&cookies, &cookies_from(&failed));

    let modal = body_text(
        storefront
            .get(
                &format!("/products/{PRODUCT_ID}/incentive"),
                Some(&cookies),
            )
            .await,
    )
    .await;
    assert!(modal.contains("$5 CASH GIFT"));

    let response = storefront
        .post_form(
            &format!("/products/{PRODUCT_ID}/checkout"),
            "variant_id=1",
            Some(&cookies),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_navigation_resets_incentive_counter() {
    let storefront = TestStorefront::start().await;

    let cookies = land(&storefront, "").await;
    let cookies = dismiss(&storefront, &cookies).await;

    let revisit = storefront
        .get(&format!("/products/{PRODUCT_ID}"), Some(&cookies))
        .await;
    let cookies = merge_cookies(&cookies, &cookies_from(&revisit));

    let modal = body_text(
        storefront
            .get(
                &format!("/products/{PRODUCT_ID}/incentive"),
                Some(&cookies),
            )
            .await,
    )
    .await;
    assert!(modal.contains("Only Today!"));
    assert!(modal.contains("$3 cash bonus"));
}

#[tokio::test]
async fn test_sold_out_variant_is_rejected() {
    let storefront = TestStorefront::start().await;
    mount_cart_create(&storefront.shopify, 0).await;

    let cookies = land(&storefront, "").await;
    let response = storefront
        .post_form(
            &format!("/products/{PRODUCT_ID}/checkout"),
            "variant_id=3",
            Some(&cookies),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_foreign_variant_is_rejected() {
    let storefront = TestStorefront::start().await;
    mount_cart_create(&storefront.shopify, 0).await;

    let response = storefront
        .post_form(
            &format!("/products/{PRODUCT_ID}/checkout"),
            "variant_id=999",
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_direct_checkout_redirects_without_discount() {
    let storefront = TestStorefront::start().await;
    mount_cart_create(&storefront.shopify, 1).await;
    forbid_discount_update(&storefront.shopify).await;

    let response = storefront.get("/checkout/1", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], CHECKOUT_URL);
}

#[tokio::test]
async fn test_checkout_failure_is_bad_gateway() {
    let storefront = TestStorefront::start().await;
    forbid_discount_update(&storefront.shopify).await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::body_partial_json(
            serde_json::json!({"operationName": "CartCreate"}),
        ))
        .respond_with(wiremock::ResponseTemplate::new(503))
        .mount(&storefront.shopify)
        .await;

    let response = storefront.get("/checkout/1", None).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
