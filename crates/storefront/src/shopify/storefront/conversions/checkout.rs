//! Checkout mutation conversion functions.

use crate::shopify::ShopifyError;
use crate::shopify::types::{CheckoutSession, DiscountApplication};

use super::super::queries::{cart_create, cart_discount_codes_update, common};

/// Join mutation user errors into one message (`field: message; ...`).
#[must_use]
fn join_user_errors(errors: &[common::UserError]) -> String {
    errors
        .iter()
        .map(|e| match e.field.as_deref() {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convert a `cartCreate` payload into a checkout session.
///
/// # Errors
///
/// Returns `ShopifyError::UserError` when Shopify rejected the input, and
/// `ShopifyError::InvalidResponse` when no usable cart came back.
pub fn convert_checkout_session(
    data: cart_create::ResponseData,
) -> Result<CheckoutSession, ShopifyError> {
    let payload = data
        .cart_create
        .ok_or_else(|| ShopifyError::InvalidResponse("cartCreate returned null".to_string()))?;

    if !payload.user_errors.is_empty() {
        return Err(ShopifyError::UserError(join_user_errors(&payload.user_errors)));
    }

    let cart = payload
        .cart
        .ok_or_else(|| ShopifyError::InvalidResponse("cartCreate returned no cart".to_string()))?;

    CheckoutSession::from_cart(&cart.id, &cart.checkout_url)
}

/// Convert a `cartDiscountCodesUpdate` payload into the code's status.
///
/// A code missing from the returned cart is reported as not applicable.
///
/// # Errors
///
/// Returns `ShopifyError::UserError` when Shopify rejected the mutation.
pub fn convert_discount_application(
    data: cart_discount_codes_update::ResponseData,
    code: &str,
) -> Result<DiscountApplication, ShopifyError> {
    let payload = data.cart_discount_codes_update.ok_or_else(|| {
        ShopifyError::InvalidResponse("cartDiscountCodesUpdate returned null".to_string())
    })?;

    if !payload.user_errors.is_empty() {
        return Err(ShopifyError::UserError(join_user_errors(&payload.user_errors)));
    }

    let applicable = payload.cart.is_some_and(|cart| {
        cart.discount_codes
            .iter()
            .any(|d| d.applicable && d.code.eq_ignore_ascii_case(code))
    });

    Ok(DiscountApplication {
        code: code.to_string(),
        applicable,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_checkout_session() {
        let data: cart_create::ResponseData = serde_json::from_str(
            r#"{"cartCreate": {
                "cart": {"id": "gid://shopify/Cart/tok123?key=k", "checkoutUrl": "https://shop.example.test/cart/c/tok123?key=k"},
                "userErrors": []
            }}"#,
        )
        .unwrap();

        let session = convert_checkout_session(data).unwrap();
        assert_eq!(session.id, "tok123");
    }

    #[test]
    fn test_convert_checkout_session_user_errors() {
        let data: cart_create::ResponseData = serde_json::from_str(
            r#"{"cartCreate": {
                "cart": null,
                "userErrors": [{"field": ["input", "lines", "0", "merchandiseId"], "message": "The merchandise does not exist."}]
            }}"#,
        )
        .unwrap();

        let err = convert_checkout_session(data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User error: input.lines.0.merchandiseId: The merchandise does not exist."
        );
    }

    #[test]
    fn test_convert_checkout_session_no_cart() {
        let data: cart_create::ResponseData =
            serde_json::from_str(r#"{"cartCreate": {"cart": null, "userErrors": []}}"#).unwrap();
        assert!(matches!(
            convert_checkout_session(data),
            Err(ShopifyError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_convert_discount_application() {
        let data: cart_discount_codes_update::ResponseData = serde_json::from_str(
            r#"{"cartDiscountCodesUpdate": {
                "cart": {"id": "gid://shopify/Cart/tok", "discountCodes": [{"code": "ABC5", "applicable": false}]},
                "userErrors": []
            }}"#,
        )
        .unwrap();

        let applied = convert_discount_application(data, "ABC5").unwrap();
        assert_eq!(applied.code, "ABC5");
        assert!(!applied.applicable);
    }
}
