//! Core types for Quickbuy.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod gid;
pub mod incentive;
pub mod price;

pub use gid::*;
pub use incentive::{
    DiscountOffer, IncentiveOffers, IncentiveSequencer, OFFER_TIERS, OfferTableError,
};
pub use price::{Price, PriceError};
