//! Product page rendering, tracking, and security headers.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use quickbuy_integration_tests::{
    MISSING_PRODUCT_ID, PRODUCT_ID, TestStorefront, body_text, cookies_from, merge_cookies,
};

#[tokio::test]
async fn test_health() {
    let storefront = TestStorefront::start().await;
    let response = storefront.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let storefront = TestStorefront::start().await;
    let response = storefront
        .get(&format!("/products/{MISSING_PRODUCT_ID}"), None)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Not found");

    let localized = storefront
        .get(&format!("/en-ca/products/{MISSING_PRODUCT_ID}"), None)
        .await;
    assert_eq!(localized.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_view_content_user_id_persists_across_visits() {
    let storefront = TestStorefront::start().await;
    let path = format!("/products/{PRODUCT_ID}");

    let first = storefront.get(&path, None).await;
    assert_eq!(first.status(), StatusCode::OK);
    let cookies = cookies_from(&first);
    let user_id = cookies
        .split("; ")
        .find_map(|pair| pair.strip_prefix("_user_id="))
        .unwrap()
        .to_string();

    let second = storefront.get(&path, Some(&cookies)).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert!(
        !cookies_from(&second).contains("_user_id="),
        "user id cookie is only set once"
    );

    let events = storefront.tracked_events(2).await;
    assert_eq!(events.len(), 2);
    for event in &events {
        assert_eq!(event["event"], "ViewContent");
        assert_eq!(event["userId"], user_id.as_str());
        assert_eq!(event["source"], "web");
        assert_eq!(event["shop"], "quick.example.test");
        assert_eq!(event["productId"], PRODUCT_ID);
    }
    assert_ne!(events[0]["eventId"], events[1]["eventId"]);
}

#[tokio::test]
async fn test_no_params_selects_first_variant() {
    let storefront = TestStorefront::start().await;
    let response = storefront
        .get(&format!("/products/{PRODUCT_ID}"), None)
        .await;
    let body = body_text(response).await;

    assert!(body.contains(r#"name="variant_id" value="1""#));
    assert!(body.contains("$19.90"));
    assert!(body.contains("$29.90"));

    let events = storefront.tracked_events(1).await;
    assert_eq!(events[0]["productVariantId"], 1);
    assert_eq!(events[0]["productPrice"], 19.9);
    assert_eq!(events[0]["productCurrency"], "USD");
}

#[tokio::test]
async fn test_size_param_selects_matching_variant() {
    let storefront = TestStorefront::start().await;
    let response = storefront
        .get(&format!("/products/{PRODUCT_ID}?Size=M"), None)
        .await;
    let body = body_text(response).await;

    assert!(body.contains(r#"name="variant_id" value="2""#));
    assert!(body.contains(r#"href="/products/42?Size=M" aria-current="true""#));

    let events = storefront.tracked_events(1).await;
    assert_eq!(events[0]["productVariantId"], 2);
    assert_eq!(events[0]["page"], "http://storefront.test/products/42?Size=M");
}

#[tokio::test]
async fn test_unknown_option_value_shows_first_variant() {
    let storefront = TestStorefront::start().await;
    let response = storefront
        .get(&format!("/products/{PRODUCT_ID}?Size=XXL"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;

    assert!(body.contains(r#"name="variant_id" value="1""#));

    let events = storefront.tracked_events(1).await;
    assert_eq!(events[0]["productVariantId"], 1);
}

#[tokio::test]
async fn test_click_id_marks_ad_source() {
    let storefront = TestStorefront::start().await;
    storefront
        .get(&format!("/products/{PRODUCT_ID}?ttclid=click-123"), None)
        .await;

    let events = storefront.tracked_events(1).await;
    assert_eq!(events[0]["source"], "tiktok");
    assert_eq!(events[0]["cid"], "click-123");
    // The click id is not an option selection
    assert_eq!(events[0]["productVariantId"], 1);
}

#[tokio::test]
async fn test_localized_page_links_keep_locale() {
    let storefront = TestStorefront::start().await;
    let response = storefront
        .get(&format!("/en-ca/products/{PRODUCT_ID}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains(r#"action="/en-ca/products/42/checkout""#));
    assert!(body.contains(r#"data-incentive-url="/en-ca/products/42/incentive""#));
}

#[tokio::test]
async fn test_unknown_locale_is_not_found() {
    let storefront = TestStorefront::start().await;
    let response = storefront
        .get(&format!("/garbage/products/{PRODUCT_ID}"), None)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_csp_nonce_matches_inline_script() {
    let storefront = TestStorefront::start().await;
    let response = storefront
        .get(&format!("/products/{PRODUCT_ID}"), None)
        .await;

    let csp = response.headers()["content-security-policy"]
        .to_str()
        .unwrap()
        .to_string();
    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap()
        .to_string();
    assert_eq!(response.headers()["x-frame-options"], "DENY");

    let body = body_text(response).await;
    assert!(body.contains(&format!(r#"<script nonce="{nonce}">"#)));
}

#[tokio::test]
async fn test_session_cookie_survives_second_visit() {
    let storefront = TestStorefront::start().await;
    let path = format!("/products/{PRODUCT_ID}");

    let first = storefront.get(&path, None).await;
    let cookies = cookies_from(&first);
    assert!(cookies.contains("qb_session="));

    let second = storefront.get(&path, Some(&cookies)).await;
    let cookies = merge_cookies(&cookies, &cookies_from(&second));
    assert!(cookies.contains("qb_session="));
    assert!(cookies.contains("_user_id="));
}
