//! # FarmEase CLI
//!
//! Drives the storefront commands from a terminal. Every subcommand prints
//! its JSON response on stdout; failures print the `ApiError` JSON on
//! stderr and exit non-zero.
//!
//! ## Usage
//! ```bash
//! farmease sign-in farmer@example.com secret
//! farmease search honey
//! farmease add <product-id> --quantity 2
//! farmease book <tractor-id> --from 2024-01-01 --to 2024-01-03
//! farmease cart
//! farmease checkout
//!
//! farmease sign-up grower@example.com secret --seller
//! farmease add-product --name Okra --price ₹60 --description "Picked this morning" \
//!     --image https://cdn.example.com/okra.jpg --category "Fruits and Vegetables" --stock 8
//! farmease set-stock <product-id> 0
//! farmease feedback "Fresh and on time" --rating 5
//! ```
//!
//! Configuration comes from `FARMEASE_*` variables, optionally from a
//! `.env` file in the working directory.

use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use farmease_core::{ProductDraft, UserType};
use farmease_storefront::commands::{
    cart, checkout, feedback, product, rental, seller, session,
};
use farmease_storefront::state::StorefrontConfig;
use farmease_storefront::{init_tracing, ApiError, AppContext};

#[derive(Debug, Parser)]
#[command(name = "farmease", about = "FarmEase storefront CLI", long_about = None)]
struct Cli {
    /// SQLite file holding the cart, the session and the local catalog
    #[arg(long, global = true, env = "FARMEASE_DB_PATH")]
    db: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the cart with fresh stock levels
    Cart,

    /// Add a produce product by quantity
    Add {
        product_id: String,
        #[arg(long, short, default_value_t = 1)]
        quantity: i64,
    },

    /// Price a rental booking
    Quote {
        product_id: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Book rental equipment into the cart
    Book {
        product_id: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Change a line's quantity (0 removes it)
    Update {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a line
    Remove { product_id: String },

    /// Empty the cart
    Clear,

    /// Fetch stock for the products in the cart
    Stock,

    /// Show one product
    Product { id: String },

    /// Search the local catalog by name
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// List a category of the local catalog
    Category {
        name: String,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Pay for the cart and send the invoice
    Checkout,

    /// Create an account; buyers unless --seller is given
    SignUp {
        email: String,
        password: String,
        #[arg(long)]
        seller: bool,
    },

    /// Sign in with e-mail and password
    SignIn { email: String, password: String },

    /// Sign out
    SignOut,

    /// Show the signed-in user
    Whoami,

    /// List the signed-in seller's products
    MyProducts,

    /// List a new product (sellers)
    AddProduct(ListingArgs),

    /// Replace the fields of one of your products (sellers)
    UpdateProduct {
        id: String,
        #[command(flatten)]
        listing: ListingArgs,
    },

    /// Set the stock of one of your products (sellers)
    SetStock { id: String, stock: i64 },

    /// Delete one of your products (sellers)
    DeleteProduct { id: String },

    /// Leave feedback with a 1-5 rating
    Feedback {
        text: String,
        #[arg(long, short)]
        rating: i64,
    },

    /// Read customer feedback (sellers)
    ListFeedback {
        #[arg(default_value = "")]
        query: String,
    },
}

#[derive(Debug, Args)]
struct ListingArgs {
    #[arg(long)]
    name: String,
    /// Display price, e.g. "₹1,500/day"
    #[arg(long)]
    price: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    image: String,
    #[arg(long)]
    category: String,
    #[arg(long)]
    stock: i64,
}

impl From<ListingArgs> for ProductDraft {
    fn from(args: ListingArgs) -> Self {
        ProductDraft {
            name: args.name,
            price: args.price,
            description: args.description,
            image: args.image,
            category: args.category,
            stock: args.stock,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if cli.db.is_some() {
        config.db_path = cli.db.clone();
    }

    let ctx = match AppContext::initialize(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("startup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(command = ?cli.command, "Running command");
    let result = run(&ctx, cli.command).await;
    ctx.db.close().await;

    match result {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", to_json(&err).unwrap_or_else(|e| e.to_string()));
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &AppContext, command: Commands) -> Result<String, ApiError> {
    match command {
        Commands::Cart => to_json(&cart::get_cart(ctx).await?),
        Commands::Add {
            product_id,
            quantity,
        } => to_json(&cart::add_to_cart(ctx, &product_id, quantity).await?),
        Commands::Quote {
            product_id,
            from,
            to,
        } => to_json(&rental::quote_rental(ctx, &product_id, from, to).await?),
        Commands::Book {
            product_id,
            from,
            to,
        } => to_json(&rental::book_rental(ctx, &product_id, from, to).await?),
        Commands::Update {
            product_id,
            quantity,
        } => {
            // the cart page always has fresh levels before "+" is pressed
            cart::refresh_stock(ctx).await?;
            to_json(&cart::update_cart_item(ctx, &product_id, quantity).await?)
        }
        Commands::Remove { product_id } => to_json(&cart::remove_from_cart(ctx, &product_id).await?),
        Commands::Clear => to_json(&cart::clear_cart(ctx).await?),
        Commands::Stock => to_json(&cart::refresh_stock(ctx).await?),
        Commands::Product { id } => to_json(&product::get_product(ctx, &id).await?),
        Commands::Search { query, limit } => {
            to_json(&product::search_products(ctx, &query, limit).await?)
        }
        Commands::Category { name, limit } => {
            to_json(&product::list_category(ctx, &name, limit).await?)
        }
        Commands::Checkout => {
            checkout::begin_checkout(ctx).await?;
            to_json(&checkout::submit_payment(ctx).await?)
        }
        Commands::SignUp {
            email,
            password,
            seller,
        } => {
            let user_type = if seller { UserType::Seller } else { UserType::Buyer };
            to_json(&session::sign_up(ctx, &email, &password, user_type).await?)
        }
        Commands::SignIn { email, password } => {
            to_json(&session::sign_in(ctx, &email, &password).await?)
        }
        Commands::SignOut => to_json(&session::sign_out(ctx).await?),
        Commands::Whoami => to_json(&session::current_session(ctx).await?),
        Commands::MyProducts => to_json(&seller::my_products(ctx).await?),
        Commands::AddProduct(listing) => to_json(&seller::add_product(ctx, listing.into()).await?),
        Commands::UpdateProduct { id, listing } => {
            to_json(&seller::update_product(ctx, &id, listing.into()).await?)
        }
        Commands::SetStock { id, stock } => to_json(&seller::update_stock(ctx, &id, stock).await?),
        Commands::DeleteProduct { id } => to_json(&seller::delete_product(ctx, &id).await?),
        Commands::Feedback { text, rating } => {
            to_json(&feedback::submit_feedback(ctx, &text, rating).await?)
        }
        Commands::ListFeedback { query } => to_json(&feedback::list_feedback(ctx, &query).await?),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::internal(e.to_string()))
}
