//! Newtype IDs for Shopify global IDs.
//!
//! Shopify addresses resources as `gid://shopify/<Type>/<numeric id>`, while
//! storefront URLs and the tracking endpoint use the bare numeric id. Use the
//! `define_gid!` macro to create wrappers that convert between both forms and
//! prevent mixing IDs from different resource types.

use thiserror::Error;

/// Prefix shared by every Shopify global ID.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Errors parsing a Shopify global ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GidError {
    /// The value is neither a numeric id nor a global ID.
    #[error("invalid {kind} id: {value}")]
    Invalid {
        /// Expected resource type (e.g. `Product`).
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// The global ID names a different resource type.
    #[error("expected a {expected} id, got {value}")]
    WrongKind {
        /// Expected resource type.
        expected: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// Split a global ID into its resource type and everything after it,
/// e.g. `gid://shopify/Product/42` -> `("Product", "42")`.
#[must_use]
pub fn split_gid(value: &str) -> Option<(&str, &str)> {
    let rest = value.strip_prefix(GID_PREFIX)?;
    let (kind, id) = rest.split_once('/')?;
    if kind.is_empty() || id.is_empty() {
        return None;
    }
    Some((kind, id))
}

/// Macro to define a type-safe Shopify ID wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]` (numeric form)
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `Display` printing the numeric id
/// - `gid()` formatting the `gid://shopify/<Type>/<n>` form
/// - `FromStr` accepting either the numeric or the global form
///
/// # Example
///
/// ```rust
/// # use quickbuy_core::define_gid;
/// define_gid!(ProductId, "Product");
/// define_gid!(VariantId, "ProductVariant");
///
/// let product: ProductId = "gid://shopify/Product/7".parse().unwrap();
/// assert_eq!(product.as_u64(), 7);
/// assert_eq!(product.gid(), "gid://shopify/Product/7");
///
/// // A variant GID is not a product GID
/// assert!("gid://shopify/ProductVariant/7".parse::<ProductId>().is_err());
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $kind:literal) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Shopify resource type name used in the global ID.
            pub const KIND: &'static str = $kind;

            /// Create a new ID from its numeric value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying numeric value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            /// Format as a Shopify global ID.
            #[must_use]
            pub fn gid(&self) -> String {
                format!("{}{}/{}", $crate::types::gid::GID_PREFIX, Self::KIND, self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::gid::GidError;

            fn from_str(value: &str) -> ::core::result::Result<Self, Self::Err> {
                let numeric = match $crate::types::gid::split_gid(value) {
                    Some((kind, id)) if kind == Self::KIND => id,
                    Some(_) => {
                        return Err($crate::types::gid::GidError::WrongKind {
                            expected: Self::KIND,
                            value: value.to_string(),
                        });
                    }
                    None => value,
                };

                numeric
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| $crate::types::gid::GidError::Invalid {
                        kind: Self::KIND,
                        value: value.to_string(),
                    })
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_gid!(ProductId, "Product");
define_gid!(VariantId, "ProductVariant");
