//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - `graphql_client` request/response envelopes with hand-written documents
//! - Product pages are fetched on demand; nothing is persisted locally
//! - Catalog responses are cached in memory with `moka`; checkout mutations
//!   always go to Shopify
//!
//! # Operations
//!
//! - Product page: product, options, media, variants, and shop metadata
//! - Product listing for the home page and index
//! - Checkout: one-line cart creation and discount code updates
//!
//! # Example
//!
//! ```rust,ignore
//! use quickbuy_storefront::shopify::{Locale, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.shopify);
//! let locale = Locale::new("en", "us");
//!
//! let page = client.get_product_page(product_id, &locale, 250).await?;
//! let variant = page.product.variants[0].id;
//! let session = client.create_checkout(variant, 1, &locale).await?;
//! ```

mod storefront;
pub mod types;

use std::fmt;

pub use storefront::StorefrontClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// Response parsed but violated an expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl fmt::Display for GraphQLError {
    /// `message path: a.b at line L:C`, omitting whatever is absent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);

        if !self.message.is_empty() {
            parts.push(self.message.clone());
        }
        if !self.path.is_empty() {
            let path = self
                .path
                .iter()
                .map(|segment| match segment {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".");
            parts.push(format!("path: {path}"));
        }
        if let Some(location) = self.locations.first() {
            parts.push(format!("at line {}:{}", location.line, location.column));
        }

        f.write_str(&parts.join(" "))
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(none reported)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let rendered = e.to_string();
            if rendered.is_empty() {
                format!("#{} (empty)", i + 1)
            } else {
                rendered
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(message: &str) -> GraphQLError {
        GraphQLError {
            message: message.to_string(),
            locations: vec![],
            path: vec![],
        }
    }

    #[test]
    fn test_checkout_error_messages() {
        let err = ShopifyError::NotFound("product 42".to_string());
        assert_eq!(err.to_string(), "Not found: product 42");

        let err = ShopifyError::UserError("Variant is sold out".to_string());
        assert_eq!(err.to_string(), "User error: Variant is sold out");

        let err = ShopifyError::RateLimited(2);
        assert_eq!(err.to_string(), "Rate limited, retry after 2 seconds");
    }

    #[test]
    fn test_graphql_errors_are_joined() {
        let err = ShopifyError::GraphQL(vec![
            error("Throttled"),
            error("Invalid global id 'gid://shopify/Cart/x'"),
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Throttled; Invalid global id 'gid://shopify/Cart/x'"
        );
    }

    #[test]
    fn test_graphql_error_with_path_and_location() {
        let err = GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 3, column: 7 }],
            path: vec![
                serde_json::Value::String("cartCreate".to_string()),
                serde_json::Value::String("cart".to_string()),
            ],
        };
        assert_eq!(err.to_string(), "path: cartCreate.cart at line 3:7");
    }

    #[test]
    fn test_graphql_errors_without_details() {
        assert_eq!(
            ShopifyError::GraphQL(vec![error("")]).to_string(),
            "GraphQL errors: #1 (empty)"
        );
        assert_eq!(
            ShopifyError::GraphQL(vec![]).to_string(),
            "GraphQL errors: (none reported)"
        );
    }
}
