//! Incentive modal route handlers.
//!
//! The product page script fetches the current offer when the visitor
//! presses back, and posts a dismissal when they close the modal. Each
//! dismissal moves the offer one tier up.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
};
use quickbuy_core::{DiscountOffer, IncentiveSequencer, OFFER_TIERS, VariantId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use super::context::{PageContext, locale_prefix, resolve_locale};
use super::products::ProductPath;
use super::views::product_href;
use crate::error::Result;
use crate::models::{IncentiveState, LandingPage};
use crate::services::analytics::{AnalyticsEvent, ClickAttribution, EventName};
use crate::state::AppState;

/// Incentive modal fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/incentive_modal.html")]
pub struct IncentiveModalTemplate {
    /// Offer tier, 0 to 2.
    pub tier: usize,
    /// Offer amount label.
    pub label: String,
    pub dismiss_url: String,
}

impl IncentiveModalTemplate {
    fn new(sequencer: &IncentiveSequencer, offer: &DiscountOffer, dismiss_url: String) -> Self {
        let tier = usize::try_from(sequencer.index()).map_or(OFFER_TIERS - 1, |index| {
            index.min(OFFER_TIERS - 1)
        });
        Self {
            tier,
            label: offer.label.clone(),
            dismiss_url,
        }
    }
}

/// Dismissal form, carrying the variant on screen.
#[derive(Debug, Deserialize)]
pub struct DismissForm {
    pub variant_id: Option<u64>,
}

fn dismiss_url(state: &AppState, path: &ProductPath) -> Result<String> {
    let locale = resolve_locale(state, path.locale.as_deref())?;
    let base = product_href(
        &locale_prefix(path.locale.as_deref(), &locale),
        path.product_id,
    );
    Ok(format!("{base}/incentive/dismiss"))
}

/// Render the offer for the current counter.
#[instrument(skip(state, session), fields(product_id = %path.product_id))]
pub async fn show(
    State(state): State<AppState>,
    Path(path): Path<ProductPath>,
    session: Session,
) -> Result<IncentiveModalTemplate> {
    let incentive = IncentiveState::load(&session, path.product_id).await?;
    let offer = incentive.sequencer.current_offer(state.incentive_offers());

    Ok(IncentiveModalTemplate::new(
        &incentive.sequencer,
        offer,
        dismiss_url(&state, &path)?,
    ))
}

/// Record a dismissal, report `_BtnBack`, and render the next offer.
///
/// The counter is only advanced once the product page has been fetched, so a
/// failed request leaves the stored state untouched.
#[instrument(skip(state, session, context), fields(product_id = %path.product_id))]
pub async fn dismiss(
    State(state): State<AppState>,
    Path(path): Path<ProductPath>,
    session: Session,
    context: PageContext,
    Form(form): Form<DismissForm>,
) -> Result<IncentiveModalTemplate> {
    let locale = resolve_locale(&state, path.locale.as_deref())?;
    let dismiss_url = dismiss_url(&state, &path)?;

    let page = state
        .storefront()
        .get_product_page(
            path.product_id,
            &locale,
            state.config().shopify.variant_page_size,
        )
        .await?;
    let product = &page.product;

    let mut incentive = IncentiveState::load(&session, path.product_id).await?;
    incentive.sequencer.dismiss();
    incentive.store(&session).await?;
    info!(index = incentive.sequencer.index(), "Incentive dismissed");

    let variant = form
        .variant_id
        .and_then(|id| product.variant(VariantId::new(id)))
        .or_else(|| product.first_variant());

    let (landing_page, attribution) = LandingPage::load(&session, product.id)
        .await?
        .map_or_else(
            || (context.page.clone(), ClickAttribution::default()),
            |landing| (landing.page, landing.attribution),
        );

    state.analytics().dispatch(AnalyticsEvent::for_product(
        EventName::BackButton,
        &context.event_context_for(landing_page, attribution),
        &page.shop,
        product,
        variant,
    ));

    let offer = incentive.sequencer.current_offer(state.incentive_offers());
    Ok(IncentiveModalTemplate::new(
        &incentive.sequencer,
        offer,
        dismiss_url,
    ))
}

#[cfg(test)]
mod tests {
    use quickbuy_core::IncentiveOffers;

    use super::*;

    #[test]
    fn test_tier_caps_at_last_offer() {
        let offers = IncentiveOffers::default();
        let mut sequencer = IncentiveSequencer::new();

        let mut tiers = Vec::new();
        for _ in 0..5 {
            let modal = IncentiveModalTemplate::new(
                &sequencer,
                sequencer.current_offer(&offers),
                String::new(),
            );
            tiers.push((modal.tier, modal.label));
            sequencer.dismiss();
        }

        assert_eq!(
            tiers.iter().map(|(t, _)| *t).collect::<Vec<_>>(),
            vec![0, 1, 2, 2, 2]
        );
        assert_eq!(tiers[0].1, "3");
        assert_eq!(tiers[4].1, "20");
    }
}
