//! Anonymous visitor identity.
//!
//! Every browser gets a UUID in the `_user_id` cookie on its first request.
//! Tracking events carry it as `userId`, so all events from one browser share
//! an id for the cookie's lifetime.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::Response,
};
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Cookie holding the anonymous user id.
pub const USER_ID_COOKIE: &str = "_user_id";

/// Cookie lifetime in days.
const USER_ID_MAX_AGE_DAYS: i64 = 365;

/// The visitor's anonymous id, set by [`anonymous_user_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnonymousUser(pub Uuid);

/// Read a valid user id from the request's `Cookie` headers.
fn user_id_from_cookies(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == USER_ID_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

fn user_id_cookie(id: Uuid, secure: bool) -> Cookie<'static> {
    Cookie::build((USER_ID_COOKIE, id.to_string()))
        .path("/")
        .max_age(Duration::days(USER_ID_MAX_AGE_DAYS))
        .same_site(SameSite::Lax)
        .http_only(true)
        .secure(secure)
        .build()
}

/// Ensure every request carries an [`AnonymousUser`].
///
/// Reuses the id from the `_user_id` cookie when it holds a UUID; otherwise
/// mints one and sets the cookie on the response.
pub async fn anonymous_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = user_id_from_cookies(request.headers());
    let id = existing.unwrap_or_else(Uuid::new_v4);
    request.extensions_mut().insert(AnonymousUser(id));

    let mut response = next.run(request).await;

    if existing.is_none() {
        let cookie = user_id_cookie(id, state.config().secure_cookies());
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Invalid user id cookie"),
        }
    }

    response
}

impl<S> FromRequestParts<S> for AnonymousUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(|| AppError::Internal("anonymous user middleware not applied".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_user_id_among_other_cookies() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("qb_session=abc; {USER_ID_COOKIE}={id}; theme=dark"))
                .unwrap(),
        );

        assert_eq!(user_id_from_cookies(&headers), Some(id));
    }

    #[test]
    fn test_invalid_user_id_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("_user_id=not-a-uuid"));

        assert_eq!(user_id_from_cookies(&headers), None);
    }

    #[test]
    fn test_cookie_lasts_a_year() {
        let cookie = user_id_cookie(Uuid::nil(), true);
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("_user_id=00000000-0000-0000-0000-000000000000"));
        assert!(rendered.contains("Max-Age=31536000"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Secure"));
    }
}
