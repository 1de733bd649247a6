//! Stationery CLI - command-line storefront client.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! st-cli cart show
//!
//! # Add two units of a product
//! st-cli cart add p1 "Hammer" 250 --quantity 2
//!
//! # Change or drop a line
//! st-cli cart update p1 5
//! st-cli cart remove p1
//! st-cli cart clear
//!
//! # One-shot product search
//! st-cli search query "blue pen"
//!
//! # Debounced search, one line of input per keystroke
//! st-cli search watch < keystrokes.txt
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and edit the persisted cart
//! - `search` - Query the storefront search API
//!
//! Configuration comes from the environment (and `.env`); see
//! `stationery_storefront::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::num::NonZeroU32;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use stationery_storefront::config::StorefrontConfig;
use stationery_storefront::error::AppError;
use stationery_storefront::state::StorefrontContext;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "st-cli")]
#[command(author, version, about = "Stationery storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Search products
    Search {
        #[command(subcommand)]
        action: SearchAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines with count and total
    Show,
    /// Add a product, or increase its quantity
    Add {
        /// Product identifier
        product_id: String,

        /// Product name
        name: String,

        /// Unit price (`250`, `45.90` or `45,90`)
        price: String,

        /// Units to add
        #[arg(short, long, default_value = "1")]
        quantity: NonZeroU32,

        /// Product image URL
        #[arg(long)]
        image_url: Option<String>,

        /// Product category
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove a product's line
    Remove {
        /// Product identifier
        product_id: String,
    },
    /// Set a line's quantity
    Update {
        /// Product identifier
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum SearchAction {
    /// Run a single search
    Query {
        /// Search text
        query: String,
    },
    /// Read search-box input from stdin, one line per keystroke
    Watch,
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

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stationery_storefront=info,st_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let code = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => {
            AppError::from(e).report();
            ExitCode::FAILURE
        }
    };

    // Flush pending Sentry events before exiting
    drop(sentry_guard);
    code
}

async fn run(cli: Cli, config: StorefrontConfig) -> ExitCode {
    let mut ctx = match StorefrontContext::new(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            e.report();
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => {
                commands::cart::show(&ctx);
                Ok(())
            }
            CartAction::Add {
                product_id,
                name,
                price,
                quantity,
                image_url,
                category,
            } => commands::cart::add(
                &mut ctx,
                commands::cart::AddArgs {
                    product_id,
                    name,
                    price,
                    quantity,
                    image_url,
                    category,
                },
            ),
            CartAction::Remove { product_id } => {
                commands::cart::remove(&mut ctx, &product_id);
                Ok(())
            }
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&mut ctx, &product_id, quantity),
            CartAction::Clear => {
                commands::cart::clear(&mut ctx);
                Ok(())
            }
        },
        Commands::Search { action } => match action {
            SearchAction::Query { query } => commands::search::query(&ctx, &query).await,
            SearchAction::Watch => commands::search::watch(&ctx).await,
        },
    };

    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ctx.fail(&e);
            ExitCode::FAILURE
        }
    };

    commands::show_alerts(&ctx);
    code
}
