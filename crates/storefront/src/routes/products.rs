//! Product route handlers.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use quickbuy_core::{Price, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};
use url::form_urlencoded;

use super::context::{PageContext, locale_prefix, resolve_locale};
use super::views::{ImageView, ProductCardView, product_href};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{IncentiveState, LandingPage};
use crate::services::analytics::{AnalyticsEvent, ClickAttribution, EventName};
use crate::services::variant::resolve_variant;
use crate::shopify::{Product, ProductOption, ProductVariant, Shop};
use crate::state::AppState;

/// Products shown on the listing page.
pub const LISTING_PAGE_SIZE: u32 = 48;

/// Path parameters of the listing page.
#[derive(Debug, Deserialize)]
pub struct ListingPath {
    #[serde(default)]
    pub locale: Option<String>,
}

/// Path parameters of product pages and their sub-routes.
#[derive(Debug, Deserialize)]
pub struct ProductPath {
    #[serde(default)]
    pub locale: Option<String>,
    pub product_id: ProductId,
}

/// One option value link.
#[derive(Clone)]
pub struct OptionValueView {
    pub value: String,
    pub href: String,
    pub selected: bool,
}

/// One product option with its value links.
#[derive(Clone)]
pub struct OptionView {
    pub name: String,
    pub values: Vec<OptionValueView>,
}

/// The selected variant.
#[derive(Clone)]
pub struct VariantView {
    pub id: u64,
    pub title: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub available: bool,
    pub sku: Option<String>,
}

impl VariantView {
    fn new(variant: &ProductVariant) -> Self {
        Self {
            id: variant.id.as_u64(),
            title: variant.title.clone(),
            price: variant.price.display(),
            compare_at_price: variant.markdown_from().map(Price::display),
            available: variant.available_for_sale,
            sku: variant.sku.clone().filter(|sku| !sku.is_empty()),
        }
    }
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: u64,
    pub title: String,
    pub vendor: String,
    pub description_html: String,
    pub seo_title: String,
    pub seo_description: String,
    pub images: Vec<ImageView>,
    pub options: Vec<OptionView>,
    pub variant: VariantView,
    pub shipping_policy: Option<String>,
    pub refund_policy: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nonce: String,
    pub products: Vec<ProductCardView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nonce: String,
    pub shop_name: String,
    pub product: ProductView,
    /// Form action creating the checkout.
    pub checkout_url: String,
    /// Fragment URL of the current incentive offer.
    pub incentive_url: String,
    /// Form action dismissing the incentive offer.
    pub dismiss_url: String,
}

/// Link to the product page with `name` set to `value` and every other
/// option kept at the selected variant's value.
fn option_href(
    base: &str,
    options: &[ProductOption],
    selected: &ProductVariant,
    name: &str,
    value: &str,
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for option in options {
        let chosen = if option.name == name {
            Some(value)
        } else {
            selected.option_value(&option.name)
        };
        if let Some(chosen) = chosen {
            query.append_pair(&option.name, chosen);
        }
    }
    format!("{base}?{}", query.finish())
}

fn product_view(product: &Product, shop: &Shop, variant: &ProductVariant, base: &str) -> ProductView {
    let options = if product.has_only_default_variant() {
        Vec::new()
    } else {
        product
            .options
            .iter()
            .map(|option| OptionView {
                name: option.name.clone(),
                values: option
                    .values
                    .iter()
                    .map(|value| OptionValueView {
                        value: value.clone(),
                        href: option_href(base, &product.options, variant, &option.name, value),
                        selected: variant.option_value(&option.name) == Some(value.as_str()),
                    })
                    .collect(),
            })
            .collect()
    };

    // Selected variant's image first
    let images: Vec<ImageView> = variant
        .image
        .iter()
        .chain(
            product
                .media
                .iter()
                .filter(|image| variant.image.as_ref().is_none_or(|v| v.url != image.url)),
        )
        .map(|image| ImageView::new(image, &product.title))
        .collect();

    ProductView {
        id: product.id.as_u64(),
        title: product.title.clone(),
        vendor: product.vendor.clone(),
        description_html: product.description_html.clone(),
        seo_title: product
            .seo
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("{} | {}", product.title, shop.name)),
        seo_description: product
            .seo
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| product.description.clone()),
        images,
        options,
        variant: VariantView::new(variant),
        shipping_policy: shop.shipping_policy.as_ref().map(|p| p.body.clone()),
        refund_policy: shop.refund_policy.as_ref().map(|p| p.body.clone()),
    }
}

/// Display product listing page.
#[instrument(skip(state, nonce))]
pub async fn index(
    State(state): State<AppState>,
    path: Option<Path<ListingPath>>,
    nonce: CspNonce,
) -> Result<ProductsIndexTemplate> {
    let segment = path.and_then(|Path(p)| p.locale);
    let locale = resolve_locale(&state, segment.as_deref())?;
    let prefix = locale_prefix(segment.as_deref(), &locale);

    let products = state
        .storefront()
        .get_products(LISTING_PAGE_SIZE, &locale)
        .await?;

    Ok(ProductsIndexTemplate {
        nonce: nonce.value().to_string(),
        products: products
            .iter()
            .map(|summary| ProductCardView::new(summary, &prefix))
            .collect(),
    })
}

/// Display product detail page.
///
/// Resolves the selected variant from the query string, starts a fresh
/// incentive sequence for this navigation, records the landing page, and
/// reports a `ViewContent` event.
#[instrument(skip(state, query, session, nonce, context), fields(product_id = %path.product_id))]
pub async fn show(
    State(state): State<AppState>,
    Path(path): Path<ProductPath>,
    Query(query): Query<HashMap<String, String>>,
    session: Session,
    nonce: CspNonce,
    context: PageContext,
) -> Result<ProductShowTemplate> {
    let locale = resolve_locale(&state, path.locale.as_deref())?;
    let page = state
        .storefront()
        .get_product_page(
            path.product_id,
            &locale,
            state.config().shopify.variant_page_size,
        )
        .await?;
    let product = &page.product;

    let resolved = resolve_variant(&product.options, &product.variants, &query)
        .ok_or_else(|| AppError::NotFound(format!("product {} has no variants", product.id)))?;
    if resolved.resolution.is_fallback() {
        info!(
            resolution = ?resolved.resolution,
            variant_id = %resolved.variant.id,
            "Option selection matched no variant, showing first variant"
        );
    }

    IncentiveState::begin(product.id).store(&session).await?;

    let analytics = &state.config().analytics;
    let attribution =
        ClickAttribution::from_query(&query, &analytics.click_id_param, &analytics.click_id_source);
    LandingPage {
        product_id: product.id,
        page: context.page.clone(),
        attribution: attribution.clone(),
    }
    .store(&session)
    .await?;

    state.analytics().dispatch(AnalyticsEvent::for_product(
        EventName::ViewContent,
        &context.event_context(attribution),
        &page.shop,
        product,
        Some(resolved.variant),
    ));

    let base = product_href(&locale_prefix(path.locale.as_deref(), &locale), product.id);

    Ok(ProductShowTemplate {
        nonce: nonce.value().to_string(),
        shop_name: page.shop.name.clone(),
        product: product_view(product, &page.shop, resolved.variant, &base),
        checkout_url: format!("{base}/checkout"),
        incentive_url: format!("{base}/incentive"),
        dismiss_url: format!("{base}/incentive/dismiss"),
    })
}
