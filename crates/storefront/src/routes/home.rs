//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use super::views::ProductCardView;
use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Products shown in the home page swimlane.
pub const HOME_SWIMLANE_SIZE: u32 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nonce: String,
    pub products: Vec<ProductCardView>,
}

/// Display home page with a product swimlane.
#[instrument(skip(state, nonce))]
pub async fn home(State(state): State<AppState>, nonce: CspNonce) -> Result<HomeTemplate> {
    let locale = state.config().default_locale.clone();
    let products = state
        .storefront()
        .get_products(HOME_SWIMLANE_SIZE, &locale)
        .await?;

    Ok(HomeTemplate {
        nonce: nonce.value().to_string(),
        products: products
            .iter()
            .map(|summary| ProductCardView::new(summary, ""))
            .collect(),
    })
}
