//! Habaluna CLI - Storefront client from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password is read from stdin) and merge any local cart
//! echo "$PASSWORD" | hb login -e yanet@example.cu
//!
//! # Browse and add to cart
//! hb products list --search cashmere
//! hb cart add cashmere-scarf --variant v-red -q 2
//! hb cart show
//!
//! # Wishlist
//! hb wishlist toggle felt-boots
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `whoami` - Session management
//! - `cart` - Show, add, update, remove, count, merge, clear
//! - `wishlist` - Show, add, remove, toggle
//! - `products` - List and show catalog products
//!
//! # Environment Variables
//!
//! See [`habaluna_storefront::config`]. `RUST_LOG` overrides the default
//! log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use habaluna_storefront::Storefront;
use habaluna_storefront::config::StorefrontConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "hb")]
#[command(author, version, about = "Habaluna storefront client")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password (password read from stdin)
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Keep the local cart instead of merging it into the account cart
        #[arg(long)]
        no_merge: bool,
    },
    /// Sign out and forget the stored session, cart and wishlist
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Sync with the backend and show the cart
    Show,
    /// Add a product by slug
    Add {
        /// Product slug
        slug: String,

        /// Variant ID
        #[arg(short, long)]
        variant: Option<String>,

        /// Number of units
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (values below 1 are ignored)
    Update {
        /// Cart line ID
        item_id: String,

        /// New quantity
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Cart line ID
        item_id: String,
    },
    /// Print the number of units in the cart
    Count,
    /// Push local-only lines to the account cart
    Merge,
    /// Empty the local cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Sync with the backend and show the wishlist
    Show,
    /// Save a product by slug
    Add {
        /// Product slug
        slug: String,
    },
    /// Unsave a product by slug
    Remove {
        /// Product slug
        slug: String,
    },
    /// Save or unsave a product by slug
    Toggle {
        /// Product slug
        slug: String,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Page size
        #[arg(short, long)]
        limit: Option<u32>,

        /// Full-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Category slug
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Show {
        /// Product slug
        slug: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "habaluna_storefront=info,habaluna_cli=info".into());

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = StorefrontConfig::from_env()?;
    let storefront = Storefront::new(config)?;

    match cli.command {
        Commands::Login { email, no_merge } => {
            commands::auth::login(&storefront, &email, !no_merge).await?;
        }
        Commands::Logout => commands::auth::logout(&storefront).await,
        Commands::Whoami => commands::auth::whoami(&storefront),
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront).await,
            CartAction::Add {
                slug,
                variant,
                quantity,
            } => commands::cart::add(&storefront, &slug, variant.as_deref(), quantity).await?,
            CartAction::Update { item_id, quantity } => {
                commands::cart::update(&storefront, &item_id, quantity).await?;
            }
            CartAction::Remove { item_id } => commands::cart::remove(&storefront, &item_id).await,
            CartAction::Count => commands::cart::count(&storefront),
            CartAction::Merge => commands::cart::merge(&storefront).await?,
            CartAction::Clear => commands::cart::clear(&storefront).await,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(&storefront).await,
            WishlistAction::Add { slug } => commands::wishlist::add(&storefront, &slug).await?,
            WishlistAction::Remove { slug } => {
                commands::wishlist::remove(&storefront, &slug).await?;
            }
            WishlistAction::Toggle { slug } => {
                commands::wishlist::toggle(&storefront, &slug).await?;
            }
        },
        Commands::Products { action } => match action {
            ProductsAction::List {
                page,
                limit,
                search,
                category,
            } => {
                let query = habaluna_storefront::models::ProductQuery {
                    page,
                    limit,
                    search,
                    category,
                };
                commands::products::list(&storefront, &query).await?;
            }
            ProductsAction::Show { slug } => commands::products::show(&storefront, &slug).await?,
        },
    }
    Ok(())
}
