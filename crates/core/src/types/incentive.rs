//! Incentive offers shown in the "don't leave yet" modal.
//!
//! The modal walks a fixed table of three offers. Each dismissal advances a
//! counter; the counter picks the offer shown next and the discount code
//! attached to the next checkout attempt:
//!
//! ```text
//! index 0  -> offer[0]
//! index 1  -> offer[1]
//! index 2+ -> offer[2]   (final tier, repeated)
//! ```
//!
//! The counter never moves backwards. Only a new navigation starts a new
//! sequencer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of tiers in an offer table.
pub const OFFER_TIERS: usize = 3;

/// Errors parsing an offer table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfferTableError {
    #[error("expected 3 offers, got {0}")]
    WrongTierCount(usize),
    #[error("offer {0} has no label")]
    MissingLabel(usize),
}

/// One promotional offer and the code it attaches to checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountOffer {
    /// Display label (e.g. the cash bonus amount "5").
    pub label: String,
    /// Discount code; empty means no code is applied.
    pub code: String,
}

impl DiscountOffer {
    /// Create a new offer.
    #[must_use]
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }

    /// The discount code, or `None` if this offer carries no code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        let code = self.code.trim();
        (!code.is_empty()).then_some(code)
    }
}

/// The ordered three-tier offer table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncentiveOffers {
    tiers: [DiscountOffer; OFFER_TIERS],
}

impl Default for IncentiveOffers {
    fn default() -> Self {
        Self {
            tiers: [
                DiscountOffer::new("3", ""),
                DiscountOffer::new("5", "ABC5"),
                DiscountOffer::new("20", "TT20"),
            ],
        }
    }
}

impl IncentiveOffers {
    /// Create a table from three offers.
    #[must_use]
    pub const fn new(tiers: [DiscountOffer; OFFER_TIERS]) -> Self {
        Self { tiers }
    }

    /// Parse a table from `label:code,label:code,label:code`.
    ///
    /// Codes may be empty (`3:`); a missing `:` also means no code.
    ///
    /// # Errors
    ///
    /// Returns `OfferTableError` unless exactly three offers with non-empty
    /// labels are given.
    pub fn parse(table: &str) -> Result<Self, OfferTableError> {
        let offers = table
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .enumerate()
            .map(|(i, entry)| {
                let (label, code) = entry.split_once(':').unwrap_or((entry, ""));
                let label = label.trim();
                if label.is_empty() {
                    return Err(OfferTableError::MissingLabel(i));
                }
                Ok(DiscountOffer::new(label, code.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = offers.len();
        let tiers: [DiscountOffer; OFFER_TIERS] = offers
            .try_into()
            .map_err(|_| OfferTableError::WrongTierCount(count))?;
        Ok(Self { tiers })
    }

    /// The offer for a counter value. Indexes past the table reuse the
    /// final tier.
    #[must_use]
    pub fn offer_for(&self, index: u32) -> &DiscountOffer {
        let tier = usize::try_from(index).map_or(OFFER_TIERS - 1, |i| i.min(OFFER_TIERS - 1));
        let [first, second, last] = &self.tiers;
        match tier {
            0 => first,
            1 => second,
            _ => last,
        }
    }

    /// All tiers in display order.
    #[must_use]
    pub const fn tiers(&self) -> &[DiscountOffer; OFFER_TIERS] {
        &self.tiers
    }
}

/// Counter selecting the current incentive offer.
///
/// Starts at zero, moves forward by exactly one per dismissal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveSequencer {
    index: u32,
}

impl IncentiveSequencer {
    /// A fresh sequencer (counter at zero).
    #[must_use]
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Current counter value.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Record one dismissal of the modal.
    pub const fn dismiss(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// The offer to display for the current counter.
    #[must_use]
    pub fn current_offer<'a>(&self, offers: &'a IncentiveOffers) -> &'a DiscountOffer {
        offers.offer_for(self.index)
    }

    /// The discount code the next checkout attempt should carry, if any.
    #[must_use]
    pub fn discount_code<'a>(&self, offers: &'a IncentiveOffers) -> Option<&'a str> {
        self.current_offer(offers).code()
    }
}
