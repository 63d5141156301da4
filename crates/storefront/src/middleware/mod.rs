//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CSP nonce (generate per-request nonce for inline scripts)
//! 5. Security headers (CSP with the nonce, frame/referrer policies)
//! 6. Session layer (tower-sessions over a bounded moka store)
//! 7. Anonymous user (`_user_id` cookie)
//! 8. Rate limiting on checkout routes (governor)

pub mod anonymous_user;
pub mod client_info;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use anonymous_user::{AnonymousUser, USER_ID_COOKIE, anonymous_user_middleware};
pub use client_info::{ClientInfo, client_ip};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::checkout_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{BoundedSessionStore, create_session_layer};
