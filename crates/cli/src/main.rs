//! Pocket Shop CLI - browse the demo catalog and drive a persistent cart.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! pocket-shop products --search rose
//! pocket-shop product 6
//!
//! # Fill the cart (line numbers start at 1)
//! pocket-shop cart add 6 --quantity 2
//! pocket-shop cart add-custom --name "Gift wrap" --price 1500
//! pocket-shop cart save 2
//! pocket-shop cart show
//!
//! # Place the order
//! pocket-shop login Ana --email ana@example.com
//! pocket-shop checkout --name Ana --payment card
//! pocket-shop orders --last
//! ```
//!
//! State lives in the file named by `POCKET_SHOP_DATA_FILE`; see
//! `pocket_shop_storefront::config` for every variable.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pocket_shop_core::ProductId;
use pocket_shop_storefront::Storefront;
use pocket_shop_storefront::config::ShopConfig;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "pocket-shop")]
#[command(author, version, about = "Pocket Shop demo storefront")]
struct Cli {
    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Only show products whose name or description contains this
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one catalog product
    Product {
        /// Product id
        id: ProductId,
    },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout {
        /// Buyer name
        #[arg(long)]
        name: Option<String>,

        /// Buyer email
        #[arg(long)]
        email: Option<String>,

        /// Shipping address
        #[arg(long)]
        address: Option<String>,

        /// Payment method
        #[arg(long)]
        payment: Option<String>,
    },
    /// List placed orders
    Orders {
        /// Only show the most recent order
        #[arg(long)]
        last: bool,
    },
    /// Sign in (no password; any name works)
    Login {
        /// Display name
        name: String,

        /// Contact email
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the header: greeting and cart count
    Whoami,
    /// Leave feedback
    Suggest {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines, saved lines and totals
    Show,
    /// Add a catalog product
    Add {
        /// Product id
        product_id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Add an item that is not in the catalog
    AddCustom {
        #[arg(long)]
        name: String,

        /// Unit price, e.g. `1500` or `12.50`
        #[arg(long)]
        price: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Set the quantity of a cart line
    Quantity {
        /// Line number as shown by `cart show`
        line: usize,

        quantity: i64,
    },
    /// Remove a cart line
    Remove {
        /// Line number as shown by `cart show`
        line: usize,
    },
    /// Move a cart line to the saved-for-later list
    Save {
        /// Line number as shown by `cart show`
        line: usize,
    },
    /// Move a saved line back into the cart
    Restore {
        /// Saved line number as shown by `cart show`
        line: usize,
    },
    /// Empty the cart (saved lines are kept)
    Clear,
}

fn main() {
    let config = match ShopConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::failure(&format!("Configuration error: {e}"));
            std::process::exit(2);
        }
    };

    init_tracing(config.log_json);

    let cli = Cli::parse();
    let mut shop = Storefront::open(config);

    if let Err(e) = run(cli, &mut shop) {
        if !e.is_user_facing() {
            tracing::error!("Command failed: {e}");
        }
        output::failure(&e.user_message());
        std::process::exit(1);
    }
}

/// Log to stderr so command output on stdout stays clean.
fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocket_shop=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn run(cli: Cli, shop: &mut Storefront) -> pocket_shop_storefront::Result<()> {
    let out = output::Output::new(cli.json);

    match cli.command {
        Commands::Products { search } => commands::catalog::list(shop, search.as_deref(), out),
        Commands::Product { id } => commands::catalog::show(shop, id, out)?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(shop, out),
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(shop, product_id, quantity, out)?,
            CartAction::AddCustom {
                name,
                price,
                quantity,
            } => commands::cart::add_custom(shop, &name, &price, quantity, out)?,
            CartAction::Quantity { line, quantity } => {
                commands::cart::set_quantity(shop, line, quantity, out)?;
            }
            CartAction::Remove { line } => commands::cart::remove(shop, line, out)?,
            CartAction::Save { line } => commands::cart::save(shop, line, out)?,
            CartAction::Restore { line } => commands::cart::restore(shop, line, out)?,
            CartAction::Clear => commands::cart::clear(shop, out)?,
        },
        Commands::Checkout {
            name,
            email,
            address,
            payment,
        } => commands::orders::checkout(shop, name, email, address, payment, out)?,
        Commands::Orders { last } => commands::orders::list(shop, last, out),
        Commands::Login { name, email } => {
            commands::account::login(shop, &name, email.as_deref(), out)?;
        }
        Commands::Logout => commands::account::logout(shop, out)?,
        Commands::Whoami => commands::account::whoami(shop, out),
        Commands::Suggest {
            name,
            email,
            message,
        } => commands::account::suggest(shop, &name, &email, &message, out)?,
    }
    Ok(())
}
