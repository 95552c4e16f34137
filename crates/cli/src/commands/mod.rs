//! Command implementations.

pub mod auth;
pub mod cart;
pub mod products;
pub mod wishlist;

use habaluna_storefront::api::ApiError;
use habaluna_storefront::config::ConfigError;
use habaluna_storefront::stores::AuthError;
use thiserror::Error;

/// Errors surfaced to the user by `hb`.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Sign-in or refresh failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Reading from the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The product has no variant with the requested ID.
    #[error("Product '{slug}' has no variant '{variant}'")]
    UnknownVariant { slug: String, variant: String },

    /// The command needs a signed-in session.
    #[error("Not signed in, run `hb login` first")]
    NotSignedIn,
}
