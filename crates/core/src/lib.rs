//! Habaluna Core - Shared types library.
//!
//! This crate provides common types used across all Habaluna client components:
//! - `storefront` - REST client, cart/wishlist/auth stores
//! - `cli` - The `hb` command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, and price coercion helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
