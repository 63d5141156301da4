//! Client IP and user agent extraction.
//!
//! The storefront runs behind Cloudflare and Fly.io, so the socket peer is a
//! proxy. The real client IP comes from proxy headers, checked in order of
//! trust.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, header::USER_AGENT, request::Parts},
};

/// Proxy headers carrying a single client IP.
const SINGLE_IP_HEADERS: &[&str] = &["x-real-ip", "fly-client-ip", "true-client-ip"];

fn parse_header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// Real client IP from proxy headers.
///
/// Checks `CF-Connecting-IP`, then the first `X-Forwarded-For` entry, then
/// `X-Real-IP`, `Fly-Client-IP`, and `True-Client-IP`.
#[must_use]
pub fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(ip) = parse_header_ip(headers, "cf-connecting-ip") {
        return Some(ip);
    }

    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        return Some(ip);
    }

    SINGLE_IP_HEADERS
        .iter()
        .find_map(|name| parse_header_ip(headers, name))
}

/// Client IP (proxy headers, then the socket peer) and user agent.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = client_ip(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        });

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(Self { ip, user_agent })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_cloudflare_header_wins() {
        let map = headers(&[
            ("cf-connecting-ip", "203.0.113.7"),
            ("x-forwarded-for", "198.51.100.1"),
        ]);
        assert_eq!(client_ip(&map), Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_first_forwarded_for_entry() {
        let map = headers(&[("x-forwarded-for", "198.51.100.1, 10.0.0.2")]);
        assert_eq!(client_ip(&map), Some("198.51.100.1".parse().unwrap()));
    }

    #[test]
    fn test_fly_client_ip() {
        let map = headers(&[("fly-client-ip", "2001:db8::1")]);
        assert_eq!(client_ip(&map), Some("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_garbage_is_ignored() {
        let map = headers(&[("x-forwarded-for", "unknown"), ("x-real-ip", "nope")]);
        assert_eq!(client_ip(&map), None);
    }
}
