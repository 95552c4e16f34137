//! Habaluna storefront client library.
//!
//! Client-side state for the Habaluna storefront: a typed REST client for the
//! backend, durable storage, and the auth, cart and wishlist stores built on
//! top of them.
//!
//! # Modules
//!
//! - [`api`] - REST client and the tagged [`api::ApiError`]
//! - [`stores`] - Auth, cart and wishlist stores
//! - [`catalog`] - Cached product reads
//! - [`storage`] - Durable key-value records
//! - [`state`] - [`Storefront`], everything wired together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod models;
pub mod retry;
pub mod state;
pub mod storage;
pub mod stores;

pub use state::Storefront;
