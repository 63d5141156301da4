//! Quickbuy Core - Shared types library.
//!
//! This crate provides the types shared by the storefront binary and its
//! integration tests:
//! - Shopify global IDs (`gid://shopify/<Type>/<n>`) as type-safe newtypes
//! - Decimal prices with currency-aware display
//! - The incentive offer table and the per-navigation incentive sequencer
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
