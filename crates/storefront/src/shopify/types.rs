//! Domain types for Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw
//! wire types in `storefront::queries`.

use quickbuy_core::{Price, ProductId, VariantId, split_gid};
use serde::{Deserialize, Serialize};
use url::Url;

use super::ShopifyError;

// =============================================================================
// Locale
// =============================================================================

/// Buyer context passed to `@inContext(country:, language:)`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// `LanguageCode` enum value (e.g., "EN").
    pub language: String,
    /// `CountryCode` enum value (e.g., "US").
    pub country: String,
}

impl Locale {
    /// Create a locale, normalizing both codes to upper case.
    #[must_use]
    pub fn new(language: &str, country: &str) -> Self {
        Self {
            language: language.trim().to_ascii_uppercase(),
            country: country.trim().to_ascii_uppercase(),
        }
    }

    /// Parse a `{language}-{country}` path segment such as `en-ca`.
    ///
    /// Returns `None` for anything that is not two 2-letter codes.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        let (language, country) = segment.split_once('-')?;
        let valid = |code: &str| code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic());
        (valid(language) && valid(country)).then(|| Self::new(language, country))
    }

    /// Lower-case path segment form (e.g., `en-ca`).
    #[must_use]
    pub fn segment(&self) -> String {
        format!(
            "{}-{}",
            self.language.to_ascii_lowercase(),
            self.country.to_ascii_lowercase()
        )
    }
}

// =============================================================================
// Image / SEO
// =============================================================================

/// Product or variant image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

/// SEO metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seo {
    /// Page title for search engines.
    pub title: Option<String>,
    /// Meta description.
    pub description: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Blue").
    pub value: String,
}

/// Product option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name (e.g., "Size").
    pub name: String,
    /// Available values (e.g., `["Small", "Medium", "Large"]`).
    pub values: Vec<String>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub title: String,
    pub available_for_sale: bool,
    pub sku: Option<String>,
    pub price: Price,
    /// Pre-discount price, shown struck through when higher than `price`.
    pub compare_at_price: Option<Price>,
    pub selected_options: Vec<SelectedOption>,
    pub image: Option<Image>,
}

impl ProductVariant {
    /// The value this variant carries for an option name.
    #[must_use]
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.selected_options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.value.as_str())
    }

    /// The compare-at price when it marks this variant as discounted.
    #[must_use]
    pub fn markdown_from(&self) -> Option<&Price> {
        self.compare_at_price
            .as_ref()
            .filter(|compare_at| self.price.is_discounted_from(compare_at))
    }
}

/// A product with its options, media, and first page of variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    pub vendor: String,
    /// Plain-text description.
    pub description: String,
    /// Rich-text description (HTML from Shopify admin).
    pub description_html: String,
    pub options: Vec<ProductOption>,
    /// Product images in display order.
    pub media: Vec<Image>,
    /// Variants in API order, capped at the configured page size.
    pub variants: Vec<ProductVariant>,
    pub seo: Seo,
}

impl Product {
    /// Look up a variant of this product by id.
    #[must_use]
    pub fn variant(&self, id: VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// The first variant in API order.
    #[must_use]
    pub fn first_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// Whether the product has a single default variant and no real options.
    #[must_use]
    pub fn has_only_default_variant(&self) -> bool {
        self.variants.len() <= 1
            && self
                .options
                .iter()
                .all(|o| o.values.len() <= 1 && o.name == "Title")
    }
}

/// Listing entry used by the home page and product index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    pub vendor: String,
    pub available_for_sale: bool,
    pub featured_image: Option<Image>,
    /// Lowest variant price.
    pub price: Price,
    /// Lowest variant compare-at price, when any variant has one.
    pub compare_at_price: Option<Price>,
}

impl ProductSummary {
    /// The compare-at price when it marks the product as discounted.
    #[must_use]
    pub fn markdown_from(&self) -> Option<&Price> {
        self.compare_at_price
            .as_ref()
            .filter(|compare_at| self.price.is_discounted_from(compare_at))
    }
}

// =============================================================================
// Shop Types
// =============================================================================

/// The shop's primary storefront domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryDomain {
    pub url: String,
    pub host: String,
}

/// A shop policy page (shipping, refund).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopPolicy {
    pub handle: String,
    /// Policy body as HTML.
    pub body: String,
}

/// Shop metadata shown alongside a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    pub name: String,
    pub primary_domain: PrimaryDomain,
    pub shipping_policy: Option<ShopPolicy>,
    pub refund_policy: Option<ShopPolicy>,
}

/// Everything the product detail page needs from one catalog fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub product: Product,
    pub shop: Shop,
}

// =============================================================================
// Checkout Types
// =============================================================================

/// A hosted checkout created for a single variant.
///
/// Shopify identifies the session by a cart GID
/// (`gid://shopify/Cart/<token>?key=<secret>`); the hosted checkout URL ends
/// in the same `<token>` path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Session token (the hosted URL's final path segment).
    pub id: String,
    /// Reference handle used for follow-up mutations (the cart GID).
    pub handle: String,
    /// Hosted checkout URL the buyer is redirected to.
    pub checkout_url: Url,
}

impl CheckoutSession {
    /// Build a session from the cart GID and checkout URL Shopify returned.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::InvalidResponse` if the handle is not a cart
    /// GID, the URL does not parse, or the URL's final path segment does not
    /// match the token in the handle.
    pub fn from_cart(handle: &str, checkout_url: &str) -> Result<Self, ShopifyError> {
        let id = match split_gid(handle) {
            Some(("Cart", rest)) => rest.split('?').next().unwrap_or_default(),
            _ => "",
        };
        if id.is_empty() {
            return Err(ShopifyError::InvalidResponse(format!(
                "checkout handle is not a cart id: {handle}"
            )));
        }

        let checkout_url = Url::parse(checkout_url).map_err(|e| {
            ShopifyError::InvalidResponse(format!("invalid checkout url {checkout_url}: {e}"))
        })?;

        let segment = checkout_url
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()));
        if segment != Some(id) {
            return Err(ShopifyError::InvalidResponse(format!(
                "checkout url {checkout_url} does not end in session token {id}"
            )));
        }

        Ok(Self {
            id: id.to_string(),
            handle: handle.to_string(),
            checkout_url,
        })
    }
}

/// Outcome of attaching a discount code to a checkout session.
///
/// `applicable` is Shopify's verdict on the code; it is reported for logging
/// and analytics only and never blocks the checkout hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountApplication {
    pub code: String,
    pub applicable: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_segment() {
        let locale = Locale::from_segment("en-ca").unwrap();
        assert_eq!(locale.language, "EN");
        assert_eq!(locale.country, "CA");
        assert_eq!(locale.segment(), "en-ca");
    }

    #[test]
    fn test_locale_rejects_non_locale_segments() {
        assert!(Locale::from_segment("products").is_none());
        assert!(Locale::from_segment("eng-us").is_none());
        assert!(Locale::from_segment("e1-us").is_none());
        assert!(Locale::from_segment("-us").is_none());
    }

    #[test]
    fn test_checkout_session_from_cart() {
        let session = CheckoutSession::from_cart(
            "gid://shopify/Cart/Z2NwLXVzLWVhc3QxOjAxSjk?key=4f1e2d",
            "https://shop.example.test/cart/c/Z2NwLXVzLWVhc3QxOjAxSjk?key=4f1e2d",
        )
        .unwrap();

        assert_eq!(session.id, "Z2NwLXVzLWVhc3QxOjAxSjk");
        assert_eq!(
            session.checkout_url.path_segments().unwrap().next_back(),
            Some(session.id.as_str())
        );
        assert_eq!(
            session.handle,
            "gid://shopify/Cart/Z2NwLXVzLWVhc3QxOjAxSjk?key=4f1e2d"
        );
    }

    #[test]
    fn test_checkout_session_rejects_mismatched_url() {
        let result = CheckoutSession::from_cart(
            "gid://shopify/Cart/abc?key=1",
            "https://shop.example.test/cart/c/xyz?key=1",
        );
        assert!(matches!(result, Err(ShopifyError::InvalidResponse(_))));
    }

    #[test]
    fn test_checkout_session_rejects_non_cart_handle() {
        let result = CheckoutSession::from_cart(
            "gid://shopify/Checkout/abc",
            "https://shop.example.test/cart/c/abc",
        );
        assert!(matches!(result, Err(ShopifyError::InvalidResponse(_))));
    }

    fn variant(price: &str, compare_at: Option<&str>) -> ProductVariant {
        ProductVariant {
            id: VariantId::new(1),
            title: "Default Title".to_string(),
            available_for_sale: true,
            sku: None,
            price: Price::parse(price, "USD").unwrap(),
            compare_at_price: compare_at.map(|c| Price::parse(c, "USD").unwrap()),
            selected_options: vec![SelectedOption {
                name: "Size".to_string(),
                value: "M".to_string(),
            }],
            image: None,
        }
    }

    #[test]
    fn test_variant_markdown_from() {
        assert!(variant("10.00", Some("15.00")).markdown_from().is_some());
        assert!(variant("10.00", Some("10.00")).markdown_from().is_none());
        assert!(variant("10.00", None).markdown_from().is_none());
    }

    #[test]
    fn test_variant_option_value() {
        let v = variant("10.00", None);
        assert_eq!(v.option_value("Size"), Some("M"));
        assert_eq!(v.option_value("Color"), None);
    }
}
