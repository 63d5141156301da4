//! Product type conversion functions.

use quickbuy_core::{Price, ProductId, VariantId};
use rust_decimal::Decimal;
use tracing::warn;

use crate::shopify::ShopifyError;
use crate::shopify::types::{
    Image, PrimaryDomain, Product, ProductOption, ProductPage, ProductSummary, ProductVariant,
    SelectedOption, Seo, Shop, ShopPolicy,
};

use super::super::queries::{common, product_page, products};

fn convert_image(image: common::Image) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text,
        width: image.width,
        height: image.height,
    }
}

fn convert_money(money: &common::Money) -> Result<Price, ShopifyError> {
    Price::parse(&money.amount, &money.currency_code)
        .map_err(|e| ShopifyError::InvalidResponse(e.to_string()))
}

fn parse_id<T: std::str::FromStr>(id: &str) -> Result<T, ShopifyError>
where
    T::Err: std::fmt::Display,
{
    id.parse::<T>()
        .map_err(|e| ShopifyError::InvalidResponse(e.to_string()))
}

// =============================================================================
// Product Page
// =============================================================================

fn convert_variant(variant: product_page::Variant) -> Result<ProductVariant, ShopifyError> {
    Ok(ProductVariant {
        id: parse_id::<VariantId>(&variant.id)?,
        price: convert_money(&variant.price)?,
        compare_at_price: variant
            .compare_at_price
            .as_ref()
            .map(convert_money)
            .transpose()?,
        title: variant.title,
        available_for_sale: variant.available_for_sale,
        sku: variant.sku.filter(|sku| !sku.is_empty()),
        selected_options: variant
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
        image: variant.image.map(convert_image),
    })
}

fn convert_policy(policy: product_page::ShopPolicy) -> ShopPolicy {
    ShopPolicy {
        handle: policy.handle,
        body: policy.body,
    }
}

fn convert_shop(shop: product_page::Shop) -> Shop {
    Shop {
        name: shop.name,
        primary_domain: PrimaryDomain {
            url: shop.primary_domain.url,
            host: shop.primary_domain.host,
        },
        shipping_policy: shop.shipping_policy.map(convert_policy),
        refund_policy: shop.refund_policy.map(convert_policy),
    }
}

/// Convert a `ProductPage` response into the domain page.
///
/// # Errors
///
/// Returns `ShopifyError::NotFound` when the product does not exist, or
/// `ShopifyError::InvalidResponse` for malformed ids or prices.
pub fn convert_product_page(
    data: product_page::ResponseData,
    requested: ProductId,
) -> Result<ProductPage, ShopifyError> {
    let product = data
        .product
        .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {requested}")))?;

    let variants = product
        .variants
        .nodes
        .into_iter()
        .map(convert_variant)
        .collect::<Result<Vec<_>, _>>()?;

    let product = Product {
        id: parse_id::<ProductId>(&product.id)?,
        handle: product.handle,
        title: product.title,
        vendor: product.vendor,
        description: product.description,
        description_html: product.description_html,
        options: product
            .options
            .into_iter()
            .map(|o| ProductOption {
                name: o.name,
                values: o.option_values.into_iter().map(|v| v.name).collect(),
            })
            .collect(),
        media: product
            .media
            .nodes
            .into_iter()
            .filter_map(|node| node.image)
            .map(convert_image)
            .collect(),
        variants,
        seo: Seo {
            title: product.seo.title,
            description: product.seo.description,
        },
    };

    Ok(ProductPage {
        product,
        shop: convert_shop(data.shop),
    })
}

// =============================================================================
// Listing
// =============================================================================

fn convert_summary(product: products::Product) -> Result<ProductSummary, ShopifyError> {
    // Shopify reports a zero compare-at range when no variant has one
    let compare_at_price = Some(convert_money(
        &product.compare_at_price_range.min_variant_price,
    )?)
    .filter(|price| price.amount > Decimal::ZERO);

    Ok(ProductSummary {
        id: parse_id::<ProductId>(&product.id)?,
        price: convert_money(&product.price_range.min_variant_price)?,
        compare_at_price,
        handle: product.handle,
        title: product.title,
        vendor: product.vendor,
        available_for_sale: product.available_for_sale,
        featured_image: product.featured_image.map(convert_image),
    })
}

/// Convert a `Products` response, skipping entries that fail to convert.
#[must_use]
pub fn convert_product_summaries(data: products::ResponseData) -> Vec<ProductSummary> {
    data.products
        .nodes
        .into_iter()
        .filter_map(|product| {
            let id = product.id.clone();
            convert_summary(product)
                .inspect_err(|e| warn!(product_id = %id, error = %e, "Skipping product in listing"))
                .ok()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_page_json(product: &str) -> String {
        format!(
            r#"{{
                "product": {product},
                "shop": {{
                    "name": "Quick Shop",
                    "primaryDomain": {{"url": "https://quick.example.test", "host": "quick.example.test"}},
                    "shippingPolicy": {{"handle": "shipping-policy", "body": "<p>Ships fast</p>"}},
                    "refundPolicy": null
                }}
            }}"#
        )
    }

    const PRODUCT: &str = r#"{
        "id": "gid://shopify/Product/42",
        "handle": "tee",
        "title": "Tee",
        "vendor": "Quick",
        "description": "A tee",
        "descriptionHtml": "<p>A tee</p>",
        "options": [{"name": "Size", "optionValues": [{"name": "S"}, {"name": "M"}]}],
        "media": {"nodes": [{}, {"image": {"url": "https://cdn.shopify.com/tee.jpg", "altText": "Tee", "width": 800, "height": 800}}]},
        "variants": {"nodes": [
            {
                "id": "gid://shopify/ProductVariant/1",
                "title": "S",
                "availableForSale": true,
                "sku": "",
                "selectedOptions": [{"name": "Size", "value": "S"}],
                "image": null,
                "price": {"amount": "19.9", "currencyCode": "USD"},
                "compareAtPrice": {"amount": "29.9", "currencyCode": "USD"}
            },
            {
                "id": "gid://shopify/ProductVariant/2",
                "title": "M",
                "availableForSale": false,
                "sku": "TEE-M",
                "selectedOptions": [{"name": "Size", "value": "M"}],
                "image": null,
                "price": {"amount": "19.9", "currencyCode": "USD"},
                "compareAtPrice": null
            }
        ]},
        "seo": {"title": null, "description": null}
    }"#;

    #[test]
    fn test_convert_product_page() {
        let data: product_page::ResponseData =
            serde_json::from_str(&product_page_json(PRODUCT)).unwrap();
        let page = convert_product_page(data, ProductId::new(42)).unwrap();

        assert_eq!(page.product.id, ProductId::new(42));
        assert_eq!(page.product.options[0].values, vec!["S", "M"]);
        assert_eq!(page.product.media.len(), 1);
        assert_eq!(page.product.variants.len(), 2);
        assert_eq!(page.product.variants[0].id, VariantId::new(1));
        assert_eq!(page.product.variants[0].sku, None);
        assert_eq!(page.product.variants[1].sku.as_deref(), Some("TEE-M"));
        assert_eq!(page.shop.primary_domain.host, "quick.example.test");
        assert!(page.shop.refund_policy.is_none());
    }

    #[test]
    fn test_convert_missing_product_is_not_found() {
        let data: product_page::ResponseData =
            serde_json::from_str(&product_page_json("null")).unwrap();
        let result = convert_product_page(data, ProductId::new(7));
        assert!(matches!(result, Err(ShopifyError::NotFound(_))));
    }

    #[test]
    fn test_convert_summaries_drops_zero_compare_at() {
        let data: products::ResponseData = serde_json::from_str(
            r#"{"products": {"nodes": [
                {
                    "id": "gid://shopify/Product/1",
                    "handle": "a", "title": "A", "vendor": "V", "availableForSale": true,
                    "featuredImage": null,
                    "priceRange": {"minVariantPrice": {"amount": "5.0", "currencyCode": "USD"}},
                    "compareAtPriceRange": {"minVariantPrice": {"amount": "0.0", "currencyCode": "USD"}}
                },
                {
                    "id": "not-a-gid",
                    "handle": "b", "title": "B", "vendor": "V", "availableForSale": true,
                    "featuredImage": null,
                    "priceRange": {"minVariantPrice": {"amount": "5.0", "currencyCode": "USD"}},
                    "compareAtPriceRange": {"minVariantPrice": {"amount": "0.0", "currencyCode": "USD"}}
                }
            ]}}"#,
        )
        .unwrap();

        let summaries = convert_product_summaries(data);
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].compare_at_price.is_none());
    }
}
