//! Selected-variant resolution from page address query parameters.
//!
//! Product pages encode option choices as query parameters named after the
//! product's options (`?Size=M&Color=Blue`). Parameters that do not name a
//! declared option (click ids, UTM tags) are not part of the selection.
//!
//! Resolution never fails while the product has variants. When the selection
//! does not identify a variant the first variant is used, and the
//! [`Resolution`] records why.

use std::collections::HashMap;

use crate::shopify::{ProductOption, ProductVariant};

/// Why the first variant was used instead of a matched one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The address named no options.
    NoSelection,
    /// Some declared options were missing from the address.
    Partial,
    /// Every option was given but no variant has that combination.
    Unmatched,
}

/// How the selected variant was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Every declared option matched this variant.
    Matched,
    /// First variant, because nothing was selected.
    Default(FallbackReason),
    /// First variant, because the selection was incomplete or unknown.
    Fallback(FallbackReason),
}

impl Resolution {
    /// Whether the address carried a selection that was not honoured.
    #[must_use]
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// The variant chosen for a page render.
#[derive(Debug, Clone, Copy)]
pub struct VariantResolution<'a> {
    pub variant: &'a ProductVariant,
    pub resolution: Resolution,
}

/// Resolve the selected variant from query parameters.
///
/// Returns `None` only when `variants` is empty.
#[must_use]
pub fn resolve_variant<'a>(
    options: &[ProductOption],
    variants: &'a [ProductVariant],
    query: &HashMap<String, String>,
) -> Option<VariantResolution<'a>> {
    let first = variants.first()?;

    let selection: Vec<(&str, &str)> = options
        .iter()
        .filter_map(|option| {
            query
                .get(&option.name)
                .map(|value| (option.name.as_str(), value.as_str()))
        })
        .collect();

    let fallback = |resolution| {
        tracing::debug!(
            ?resolution,
            variant_id = %first.id,
            selected = selection.len(),
            declared = options.len(),
            "Using first variant"
        );
        Some(VariantResolution {
            variant: first,
            resolution,
        })
    };

    if selection.is_empty() {
        return fallback(Resolution::Default(FallbackReason::NoSelection));
    }
    if selection.len() < options.len() {
        return fallback(Resolution::Fallback(FallbackReason::Partial));
    }

    let matched = variants.iter().find(|variant| {
        selection
            .iter()
            .all(|(name, value)| variant.option_value(name) == Some(*value))
    });

    match matched {
        Some(variant) => Some(VariantResolution {
            variant,
            resolution: Resolution::Matched,
        }),
        None => fallback(Resolution::Fallback(FallbackReason::Unmatched)),
    }
}
