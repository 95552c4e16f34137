//! Domain models shared by the REST client and the client-side stores.
//!
//! Field names follow the backend's camelCase JSON. Monetary fields are read
//! through [`habaluna_core::price::lenient`] so numbers and numeric strings
//! both land as `Option<Decimal>`.

pub mod cart;
pub mod product;
pub mod session;
pub mod user;
pub mod wishlist;

pub use cart::{AddCartItem, CartItem, CartState, UpdateCartItem};
pub use product::{Product, ProductPage, ProductQuery, ProductSnapshot, ProductVariant, VariantSnapshot};
pub use session::{AuthSession, LoginRequest, PersistedSession, RefreshRequest};
pub use user::User;
pub use wishlist::{AddWishlistItem, WishlistItem, WishlistState};
