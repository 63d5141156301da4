//! Business logic services for storefront.
//!
//! # Services
//!
//! - `variant` - Selected-variant resolution from query parameters
//! - `checkout` - Checkout session creation, discount codes, hosted hand-off
//! - `analytics` - Best-effort ad-tracking event dispatch

pub mod analytics;
pub mod checkout;
pub mod variant;
