//! Per-request visitor context for tracking events.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{Uri, request::Parts},
};
use url::Url;

use crate::error::AppError;
use crate::middleware::{AnonymousUser, ClientInfo};
use crate::services::analytics::{ClickAttribution, EventContext};
use crate::shopify::Locale;
use crate::state::AppState;

/// Who is asking, from where, for which page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub user: AnonymousUser,
    pub client: ClientInfo,
    /// Absolute URL of the current request.
    pub page: String,
}

impl PageContext {
    /// Event context for this request's own page.
    #[must_use]
    pub fn event_context(&self, attribution: ClickAttribution) -> EventContext {
        self.event_context_for(self.page.clone(), attribution)
    }

    /// Event context reporting `page` instead of the request's URL.
    #[must_use]
    pub fn event_context_for(&self, page: String, attribution: ClickAttribution) -> EventContext {
        EventContext {
            user_id: self.user.0,
            page,
            user_agent: self.client.user_agent.clone(),
            ip: self.client.ip.map(|ip| ip.to_string()),
            attribution,
        }
    }
}

/// Absolute page URL for `uri` under the storefront base URL.
fn page_url(base: &Url, uri: &Uri) -> String {
    let path = uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str());
    base.join(path)
        .map_or_else(|_| base.to_string(), |url| url.to_string())
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AnonymousUser::from_request_parts(parts, state).await?;
        let Ok(client) = ClientInfo::from_request_parts(parts, state).await;

        // Nested routers see a stripped URI
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.clone(), |OriginalUri(uri)| uri.clone());

        Ok(Self {
            user,
            client,
            page: page_url(&state.config().base_url, &uri),
        })
    }
}

/// Resolve an optional locale path segment, rejecting unknown segments.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the segment is not `{language}-{country}`.
pub fn resolve_locale(state: &AppState, segment: Option<&str>) -> Result<Locale, AppError> {
    state
        .resolve_locale(segment)
        .ok_or_else(|| AppError::NotFound(format!("locale {}", segment.unwrap_or_default())))
}

/// Path prefix for links on a page: empty, or `/{segment}` for localized pages.
#[must_use]
pub fn locale_prefix(segment: Option<&str>, locale: &Locale) -> String {
    segment.map_or_else(String::new, |_| format!("/{}", locale.segment()))
}
