//! cartlink CLI - drive cart links, products and orders from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Inspect a cart link: validity, catalogue and any restored order
//! cartlink cart show 3f9a1c27e4b84d0f
//!
//! # Build a cart and submit it
//! cartlink cart checkout 3f9a1c27e4b84d0f --item p-1=2 --item p-7=1
//!
//! # Catalogue management
//! cartlink products list --search agua --active true
//! cartlink products set-stock p-1 40
//!
//! # Order management
//! cartlink orders list --status pending --limit 20
//! cartlink orders set-status o-9 confirmed
//! ```
//!
//! # Commands
//!
//! - `cart` - Customer cart-link flow (show, checkout, status)
//! - `products` - Catalogue management (list, stats, categories, set-stock, toggle)
//! - `orders` - Order management (list, stats, set-status, cancel)

#![cfg_attr(not(test), forbid(unsafe_code))]

use cartlink_admin::OrderStatus;
use cartlink_core::{OrderId, ProductId, SessionToken};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::cart::ItemArg;

const DEFAULT_LOG_FILTER: &str = "cartlink=info,cartlink_storefront=info,cartlink_admin=info";

#[derive(Parser)]
#[command(name = "cartlink")]
#[command(author, version, about = "cartlink operator tools")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open and complete cart links
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the catalogue
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Validate a cart link and show its catalogue and cart
    Show {
        /// Cart-link token
        token: SessionToken,
    },
    /// Fill a cart link's cart and submit it
    Checkout {
        /// Cart-link token
        token: SessionToken,

        /// Product and quantity as `PRODUCT_ID=QTY` (repeatable)
        #[arg(short, long = "item", required = true)]
        items: Vec<ItemArg>,
    },
    /// Show whether a cart link has been used or has expired
    Status {
        /// Cart-link token
        token: SessionToken,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Match name or description
        #[arg(short, long)]
        search: Option<String>,

        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only active (`true`) or inactive (`false`) products
        #[arg(long)]
        active: Option<bool>,

        /// Only products with (`true`) or without (`false`) stock
        #[arg(long)]
        in_stock: Option<bool>,

        /// Maximum number of products
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show catalogue counters
    Stats,
    /// List categories
    Categories,
    /// Set the stock of a product
    SetStock {
        id: ProductId,
        stock: u32,
    },
    /// Flip a product between active and inactive
    Toggle {
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List orders, newest first
    List {
        /// Only orders in this status
        #[arg(short, long)]
        status: Option<OrderStatus>,

        /// Maximum number of orders
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show order counters by status
    Stats,
    /// Move an order to a new status
    SetStatus {
        id: OrderId,
        status: OrderStatus,
    },
    /// Cancel an order
    Cancel {
        id: OrderId,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing, honouring `RUST_LOG` when it is set.
fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show { token } => commands::cart::show(token).await?,
            CartAction::Checkout { token, items } => {
                commands::cart::checkout(token, &items).await?;
            }
            CartAction::Status { token } => commands::cart::status(&token).await?,
        },
        Commands::Products { action } => {
            let client = commands::admin_client()?;
            match action {
                ProductAction::List {
                    search,
                    category,
                    active,
                    in_stock,
                    limit,
                } => {
                    let filter = cartlink_admin::ProductFilter {
                        limit,
                        search,
                        category,
                        is_active: active,
                        in_stock,
                        ..Default::default()
                    };
                    commands::products::list(&client, &filter).await?;
                }
                ProductAction::Stats => commands::products::stats(&client).await?,
                ProductAction::Categories => commands::products::categories(&client).await?,
                ProductAction::SetStock { id, stock } => {
                    commands::products::set_stock(&client, &id, stock).await?;
                }
                ProductAction::Toggle { id } => commands::products::toggle(&client, &id).await?,
            }
        }
        Commands::Orders { action } => {
            let client = commands::admin_client()?;
            match action {
                OrderAction::List { status, limit } => {
                    let filter = cartlink_admin::OrderFilter {
                        status,
                        limit,
                        offset: None,
                    };
                    commands::orders::list(&client, &filter).await?;
                }
                OrderAction::Stats => commands::orders::stats(&client).await?,
                OrderAction::SetStatus { id, status } => {
                    commands::orders::set_status(&client, &id, status).await?;
                }
                OrderAction::Cancel { id } => commands::orders::cancel(&client, &id).await?,
            }
        }
    }
    Ok(())
}
