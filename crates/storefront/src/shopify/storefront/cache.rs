//! Cache types for Storefront API responses.

use quickbuy_core::ProductId;

use crate::shopify::types::{Locale, ProductPage, ProductSummary};

/// Cache key for catalog responses.
///
/// Keys carry the locale because `@inContext` changes prices and
/// translations.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    ProductPage {
        id: ProductId,
        locale: Locale,
        variant_count: u32,
    },
    Products {
        first: u32,
        locale: Locale,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    ProductPage(Box<ProductPage>),
    Products(Vec<ProductSummary>),
}
