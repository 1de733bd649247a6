//! Product search commands.
//!
//! # Usage
//!
//! ```bash
//! # One request, printed immediately
//! st-cli search query "blue pen"
//!
//! # Each stdin line is the search box contents after a keystroke
//! printf 'b\nbl\nblu\nblue\n' | st-cli search watch
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Origin of the storefront server API
//! - `STOREFRONT_SEARCH_DEBOUNCE_MS` - Quiet period before a request (default: 300)
//! - `STOREFRONT_SEARCH_MIN_CHARS` - Minimum query length (default: 2)

use std::time::Duration;

use stationery_core::CurrencyCode;
use stationery_storefront::error::AppError;
use stationery_storefront::search::{ProductSearch, ProductSummary, SearchEvent};
use stationery_storefront::state::StorefrontContext;
use tokio::io::{AsyncBufReadExt, BufReader};

/// How long `watch` waits for outstanding responses once input ends.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Run one search and print the results.
///
/// # Errors
///
/// Returns `AppError::Api` if the request fails.
pub async fn query(ctx: &StorefrontContext, query: &str) -> Result<(), AppError> {
    let results = ctx.search_client().search(query).await?;
    print_results(query, &results, ctx.config().cart.currency);
    Ok(())
}

/// Feed stdin lines through the search debouncer and print what the
/// dropdown would show.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if stdin cannot be read.
pub async fn watch(ctx: &StorefrontContext) -> Result<(), AppError> {
    let currency = ctx.config().cart.currency;
    let (mut debouncer, mut events) = ctx.search_debouncer();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line
                    .map_err(|e| AppError::BadRequest(format!("failed to read stdin: {e}")))?;
                match line {
                    Some(line) => debouncer.input(&line),
                    None => break,
                }
            }
            Some(event) = events.recv() => print_event(event, currency),
        }
    }

    // Let the last timer fire and in-flight requests land.
    let grace = ctx.config().search.debounce + DRAIN_GRACE;
    while let Ok(Some(event)) = tokio::time::timeout(grace, events.recv()).await {
        print_event(event, currency);
    }
    Ok(())
}

fn print_event(event: SearchEvent, currency: CurrencyCode) {
    match event {
        SearchEvent::Results { query, results } => print_results(&query, &results, currency),
        SearchEvent::Hidden => tracing::info!("Search results hidden"),
    }
}

fn print_results(query: &str, results: &[ProductSummary], currency: CurrencyCode) {
    if results.is_empty() {
        tracing::info!(query = %query, "No products found");
        return;
    }

    tracing::info!(query = %query, count = results.len(), "Search results");
    for product in results {
        tracing::info!(
            "{} - {} ({})",
            product.name,
            product.display_price(currency),
            product.path()
        );
    }
}
