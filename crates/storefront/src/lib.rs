//! Quickbuy storefront: single-product pages that hand buyers straight to
//! Shopify's hosted checkout.
//!
//! The binary in `main.rs` only wires configuration, tracing, and the
//! tracking worker; everything served lives here so the integration tests
//! can drive [`routes::app`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
