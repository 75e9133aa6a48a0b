//! Vitashop CLI - browse the catalog, manage the cart, and check out.
//!
//! # Usage
//!
//! ```bash
//! # Browse products
//! vitashop products list --search zinc --page 2
//! vitashop products show 64f1c0
//!
//! # Manage the cart
//! vitashop cart add 64f1c0 --quantity 2
//! vitashop cart update 64f1c0 3
//! vitashop cart show --discount WELCOME10
//!
//! # Place the order
//! vitashop checkout --first-name Ada --last-name Lovelace \
//!     --email ada@example.com --phone 0123456789 --address "1 Analytical St"
//!
//! # Look up orders (listing needs VITASHOP_AUTH_TOKEN)
//! vitashop orders list
//! vitashop orders show 1001
//! ```
//!
//! Configuration comes from `VITASHOP_*` environment variables (see
//! `vitashop_storefront::config`); `--api-url` and `--data-dir` override
//! them.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitashop_storefront::config::StorefrontConfig;
use vitashop_storefront::{AppError, Storefront};

#[allow(clippy::print_stdout)]
mod commands;

#[derive(Parser)]
#[command(name = "vitashop")]
#[command(author, version, about = "Vitashop storefront client")]
struct Cli {
    /// Base URL of the remote API (overrides `VITASHOP_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory for local state (overrides `VITASHOP_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// List product categories, or show one
    Categories {
        /// Category ID
        id: Option<String>,
    },
    /// View and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout(commands::checkout::CheckoutArgs),
    /// Look up placed orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage favorite products
    Favorites {
        #[command(subcommand)]
        action: FavoriteAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List one page of products
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Products per page (defaults to `VITASHOP_PAGE_SIZE`)
        #[arg(short, long)]
        size: Option<u32>,

        /// Search term
        #[arg(long)]
        search: Option<String>,

        /// Category ID ("All Products" for no filter)
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show {
        /// Discount code to apply to the total
        #[arg(long)]
        discount: Option<String>,
    },
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a cart line
    Update {
        /// Product ID
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List,
    /// Show one order
    Show {
        /// Order ID
        id: String,
    },
}

#[derive(Subcommand)]
enum FavoriteAction {
    /// List favorite product IDs
    List,
    /// Add or remove a favorite
    Toggle {
        /// Product ID
        product_id: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first so Sentry can be initialized before tracing
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitashop_storefront=info,vitashop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.capture();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, mut config: StorefrontConfig) -> Result<(), AppError> {
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url)?;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let storefront = Storefront::connect(config).await?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List {
                page,
                size,
                search,
                category,
            } => commands::products::list(&storefront, page, size, search, category).await?,
            ProductAction::Show { id } => commands::products::show(&storefront, &id).await?,
        },
        Commands::Categories { id: None } => commands::products::categories(&storefront).await,
        Commands::Categories { id: Some(id) } => {
            commands::products::category(&storefront, &id).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show { discount } => commands::cart::show(&storefront, discount.as_deref()),
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&storefront, &product_id, quantity).await?,
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&storefront, &product_id, quantity).await?,
            CartAction::Remove { product_id } => {
                commands::cart::remove(&storefront, &product_id).await?;
            }
            CartAction::Clear => commands::cart::clear(&storefront).await?,
        },
        Commands::Checkout(args) => commands::checkout::run(&storefront, args).await?,
        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list(&storefront).await?,
            OrderAction::Show { id } => commands::orders::show(&storefront, &id).await?,
        },
        Commands::Favorites { action } => match action {
            FavoriteAction::List => commands::favorites::list(&storefront).await,
            FavoriteAction::Toggle { product_id } => {
                commands::favorites::toggle(&storefront, &product_id).await?;
            }
        },
    }

    Ok(())
}
