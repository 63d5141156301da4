//! Type conversion functions for Shopify Storefront API responses.

pub mod checkout;
pub mod products;

pub use checkout::{convert_checkout_session, convert_discount_application};
pub use products::{convert_product_page, convert_product_summaries};
