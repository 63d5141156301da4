//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` request/response envelopes with `reqwest` 0.13 for
//! HTTP. Catalog reads are cached using `moka` (5-minute TTL); checkout
//! mutations never are.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use quickbuy_core::{ProductId, VariantId};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{
    CheckoutSession, DiscountApplication, Locale, ProductPage, ProductSummary,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError};

use cache::{CacheKey, CacheValue};
use conversions::{
    convert_checkout_session, convert_discount_application, convert_product_page,
    convert_product_summaries,
};
use queries::{
    CartCreate, CartDiscountCodesUpdate, ProductPage as ProductPageQuery, Products,
    cart_create, cart_discount_codes_update, product_page, products,
};

const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 1000;

fn truncate(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Product pages and listings are cached for 5 minutes per locale.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint(),
                access_token: config.storefront_private_token.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            .header(
                "Shopify-Storefront-Private-Token",
                &self.inner.access_token,
            )
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                operation = request_body.operation_name,
                status = %status,
                body = %truncate(&response_text, 500),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError {
                message: format!("HTTP {status}: {}", truncate(&response_text, 200)),
                locations: vec![],
                path: vec![],
            }]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    operation = request_body.operation_name,
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");

            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        locations: e.locations.map_or_else(Vec::new, |locs| {
                            locs.into_iter()
                                .map(|l| GraphQLErrorLocation {
                                    line: i64::from(l.line),
                                    column: i64::from(l.column),
                                })
                                .collect()
                        }),
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => {
                                        serde_json::Value::String(s)
                                    }
                                    graphql_client::PathFragment::Index(i) => {
                                        serde_json::Value::Number(i.into())
                                    }
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation = request_body.operation_name,
                body = %truncate(&response_text, 500),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a product with its variants and the shop metadata.
    ///
    /// `variant_count` caps the variants requested (Shopify allows 1-250).
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the product does not exist, or
    /// another `ShopifyError` if the API request fails.
    #[instrument(skip(self), fields(product_id = %id, country = %locale.country))]
    pub async fn get_product_page(
        &self,
        id: ProductId,
        locale: &Locale,
        variant_count: u32,
    ) -> Result<ProductPage, ShopifyError> {
        let cache_key = CacheKey::ProductPage {
            id,
            locale: locale.clone(),
            variant_count,
        };

        if let Some(CacheValue::ProductPage(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product page");
            return Ok(*page);
        }

        let variables = product_page::Variables {
            id: id.gid(),
            variant_count: i64::from(variant_count),
            country: locale.country.clone(),
            language: locale.language.clone(),
        };

        let data = self.execute::<ProductPageQuery>(variables).await?;
        let page = convert_product_page(data, id)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::ProductPage(Box::new(page.clone())))
            .await;

        Ok(page)
    }

    /// Get the first `first` products (best sellers first).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(country = %locale.country))]
    pub async fn get_products(
        &self,
        first: u32,
        locale: &Locale,
    ) -> Result<Vec<ProductSummary>, ShopifyError> {
        let cache_key = CacheKey::Products {
            first,
            locale: locale.clone(),
        };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let variables = products::Variables {
            first: i64::from(first),
            country: locale.country.clone(),
            language: locale.language.clone(),
        };

        let data = self.execute::<Products>(variables).await?;
        let summaries = convert_product_summaries(data);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(summaries.clone()))
            .await;

        Ok(summaries)
    }

    // =========================================================================
    // Checkout Methods (not cached - mutable state)
    // =========================================================================

    /// Create a single-line cart and return its hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails, Shopify reports user
    /// errors, or no cart comes back.
    #[instrument(skip(self), fields(variant_id = %variant, country = %locale.country))]
    pub async fn create_checkout(
        &self,
        variant: VariantId,
        quantity: u32,
        locale: &Locale,
    ) -> Result<CheckoutSession, ShopifyError> {
        let variables = cart_create::Variables {
            input: cart_create::CartInput {
                lines: vec![cart_create::CartLineInput {
                    merchandise_id: variant.gid(),
                    quantity: i64::from(quantity),
                }],
                buyer_identity: cart_create::CartBuyerIdentityInput {
                    country_code: locale.country.clone(),
                },
            },
            country: locale.country.clone(),
            language: locale.language.clone(),
        };

        let data = self.execute::<CartCreate>(variables).await?;
        convert_checkout_session(data)
    }

    /// Replace the discount codes on a checkout session with `code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or Shopify reports user
    /// errors. An unknown code is not an error; it comes back with
    /// `applicable: false`.
    #[instrument(skip(self, handle), fields(code = %code))]
    pub async fn update_discount_codes(
        &self,
        handle: &str,
        code: &str,
    ) -> Result<DiscountApplication, ShopifyError> {
        let variables = cart_discount_codes_update::Variables {
            cart_id: handle.to_string(),
            discount_codes: vec![code.to_string()],
        };

        let data = self.execute::<CartDiscountCodesUpdate>(variables).await?;
        convert_discount_application(data, code)
    }
}
