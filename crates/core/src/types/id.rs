//! Newtype IDs for type-safe entity references.
//!
//! The backend issues string identifiers, so every ID wraps a `String`.
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! mixing IDs from different entity types.

/// Prefix carried by cart lines and wishlist entries that exist only on the client.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `Display`, `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use habaluna_core::define_id;
/// define_id!(OrderId);
/// define_id!(ReviewId);
///
/// let order_id = OrderId::new("ord_1");
/// let review_id = ReviewId::new("ord_1");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = review_id;
/// assert_eq!(order_id.as_str(), review_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariantId);
define_id!(UserId);
define_id!(CartItemId);
define_id!(WishlistItemId);

impl CartItemId {
    /// Build the client-side key for a cart line: `local-<productId>-<variantId|default>`.
    ///
    /// The same product/variant pair always maps to the same key, so repeated
    /// local adds land on one line.
    #[must_use]
    pub fn local(product_id: &ProductId, variant_id: Option<&VariantId>) -> Self {
        let variant = variant_id.map_or("default", VariantId::as_str);
        Self(format!("{LOCAL_ID_PREFIX}{product_id}-{variant}"))
    }

    /// Whether this line only exists on the client.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }
}

impl WishlistItemId {
    /// Build the client-side key for a wishlist entry: `local-<productId>`.
    #[must_use]
    pub fn local(product_id: &ProductId) -> Self {
        Self(format!("{LOCAL_ID_PREFIX}{product_id}"))
    }

    /// Whether this entry only exists on the client.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_local_cart_key_with_variant() {
        let id = CartItemId::local(&ProductId::new("p1"), Some(&VariantId::new("v9")));
        assert_eq!(id.as_str(), "local-p1-v9");
        assert!(id.is_local());
    }

    #[test]
    fn test_local_cart_key_without_variant() {
        let id = CartItemId::local(&ProductId::new("p1"), None);
        assert_eq!(id.as_str(), "local-p1-default");
    }

    #[test]
    fn test_remote_id_is_not_local() {
        assert!(!CartItemId::new("ckx81a").is_local());
        assert!(!WishlistItemId::new("w-1").is_local());
    }

    #[test]
    fn test_local_wishlist_key() {
        let id = WishlistItemId::local(&ProductId::new("p7"));
        assert_eq!(id.as_str(), "local-p7");
        assert!(id.is_local());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = ProductId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let parsed: ProductId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(parsed, id);
    }
}
