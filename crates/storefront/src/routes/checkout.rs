//! Checkout route handlers.
//!
//! Buy intent on a product page becomes a one-unit Shopify checkout carrying
//! the visitor's current incentive code, then a redirect to the hosted
//! checkout.

use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use quickbuy_core::VariantId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::context::{PageContext, resolve_locale};
use super::products::ProductPath;
use crate::error::{AppError, Result};
use crate::models::{IncentiveState, LandingPage};
use crate::services::analytics::{AnalyticsEvent, ClickAttribution, EventName};
use crate::services::checkout::CheckoutOrchestrator;
use crate::state::AppState;

/// Buy form submitted from the product page.
#[derive(Debug, Deserialize)]
pub struct BuyForm {
    pub variant_id: u64,
}

/// Create a checkout for the chosen variant and redirect to it.
///
/// The discount code is the one the incentive modal currently offers for
/// this product. `InitiateCheckout` is reported once the session exists.
#[instrument(skip(state, session, context), fields(product_id = %path.product_id))]
pub async fn buy(
    State(state): State<AppState>,
    Path(path): Path<ProductPath>,
    session: Session,
    context: PageContext,
    Form(form): Form<BuyForm>,
) -> Result<Redirect> {
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

    let variant = product
        .variant(VariantId::new(form.variant_id))
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "variant {} is not part of product {}",
                form.variant_id, product.id
            ))
        })?;
    if !variant.available_for_sale {
        return Err(AppError::BadRequest(format!(
            "variant {} is sold out",
            variant.id
        )));
    }

    let incentive = IncentiveState::load(&session, product.id).await?;
    let code = incentive.sequencer.discount_code(state.incentive_offers());

    let handoff = CheckoutOrchestrator::new(state.storefront())
        .begin(variant.id, code, &locale)
        .await?;

    let (landing_page, attribution) = LandingPage::load(&session, product.id)
        .await?
        .map_or_else(
            || (context.page.clone(), ClickAttribution::default()),
            |landing| (landing.page, landing.attribution),
        );

    state.analytics().dispatch(
        AnalyticsEvent::for_product(
            EventName::InitiateCheckout,
            &context.event_context_for(landing_page, attribution),
            &page.shop,
            product,
            Some(variant),
        )
        .with_checkout(&handoff.session.id, handoff.discount_code()),
    );

    Ok(handoff.redirect())
}

/// Redirect straight to a fresh checkout for one unit of `variant_id`.
///
/// No discount and no tracking event.
#[instrument(skip(state))]
pub async fn direct(
    State(state): State<AppState>,
    Path(variant_id): Path<VariantId>,
) -> Result<Redirect> {
    let locale = state.config().default_locale.clone();
    let handoff = CheckoutOrchestrator::new(state.storefront())
        .begin(variant_id, None, &locale)
        .await?;

    Ok(handoff.redirect())
}
