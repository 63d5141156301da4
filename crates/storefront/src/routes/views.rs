//! Display data shared by page templates.

use quickbuy_core::{Price, ProductId};

use crate::shopify::{Image, ProductSummary};

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

impl ImageView {
    /// Display data for `image`, using `fallback_alt` when it has no alt text.
    #[must_use]
    pub fn new(image: &Image, fallback_alt: &str) -> Self {
        Self {
            url: image.url.clone(),
            alt: image
                .alt_text
                .clone()
                .filter(|alt| !alt.is_empty())
                .unwrap_or_else(|| fallback_alt.to_string()),
            width: image.width,
            height: image.height,
        }
    }
}

/// Product card for the home swimlane and the listing page.
#[derive(Clone)]
pub struct ProductCardView {
    pub href: String,
    pub title: String,
    pub vendor: String,
    pub image: Option<ImageView>,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub available: bool,
}

impl ProductCardView {
    #[must_use]
    pub fn new(summary: &ProductSummary, prefix: &str) -> Self {
        Self {
            href: product_href(prefix, summary.id),
            title: summary.title.clone(),
            vendor: summary.vendor.clone(),
            image: summary
                .featured_image
                .as_ref()
                .map(|image| ImageView::new(image, &summary.title)),
            price: summary.price.display(),
            compare_at_price: summary.markdown_from().map(Price::display),
            available: summary.available_for_sale,
        }
    }
}

/// Link to a product detail page.
#[must_use]
pub fn product_href(prefix: &str, id: ProductId) -> String {
    format!("{prefix}/products/{id}")
}
