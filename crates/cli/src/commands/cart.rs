//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! st-cli cart show
//! st-cli cart add p1 "Hammer" 250 --quantity 2 --category tools
//! st-cli cart update p1 5
//! st-cli cart remove p1
//! st-cli cart clear
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_STORAGE_PATH` - File the cart is persisted in
//! - `STOREFRONT_CART_KEY` - Key the cart is stored under
//! - `STOREFRONT_CART_QUANTITY_POLICY` - `retain` or `remove`

use std::num::NonZeroU32;

use stationery_core::{AddOutcome, NewLineItem, Price, ProductId, UpdateOutcome, parse_unit_price};
use stationery_storefront::error::AppError;
use stationery_storefront::state::StorefrontContext;

/// Arguments of `cart add`.
pub struct AddArgs {
    pub product_id: String,
    pub name: String,
    pub price: String,
    pub quantity: NonZeroU32,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

/// List every line, then the item count and total.
pub fn show(ctx: &StorefrontContext) {
    let cart = ctx.cart();
    let currency = ctx.config().cart.currency;

    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for item in cart.items() {
        tracing::info!(
            "{} {} x{} @ {} = {}",
            item.product_id,
            item.name,
            item.quantity,
            Price::new(item.price, currency),
            Price::new(item.line_total(), currency),
        );
    }
    summary(ctx);
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns `AppError::Price` if the price is not a non-negative number.
pub fn add(ctx: &mut StorefrontContext, args: AddArgs) -> Result<(), AppError> {
    let price = parse_unit_price(&args.price)?;

    let mut item = NewLineItem::new(args.product_id, args.name, price)?.quantity(args.quantity);
    if let Some(image_url) = args.image_url {
        item = item.image_url(image_url);
    }
    if let Some(category) = args.category {
        item = item.category(category);
    }

    let name = item.name.clone();
    let message = match ctx.cart_mut().add(item) {
        AddOutcome::Inserted => format!("{name} added to cart"),
        AddOutcome::Merged => format!("{name}: quantity increased"),
    };
    ctx.alerts_mut().success(message);
    summary(ctx);
    Ok(())
}

/// Remove a product's line. Removing an absent product is not an error.
pub fn remove(ctx: &mut StorefrontContext, product_id: &str) {
    let product_id = ProductId::new(product_id);
    match ctx.cart_mut().remove(&product_id) {
        Some(item) => {
            ctx.alerts_mut()
                .success(format!("{} removed from cart", item.name));
        }
        None => tracing::info!(product_id = %product_id, "Product was not in the cart"),
    }
    summary(ctx);
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the product is not in the cart.
pub fn update(
    ctx: &mut StorefrontContext,
    product_id: &str,
    quantity: i64,
) -> Result<(), AppError> {
    let product_id = ProductId::new(product_id);
    match ctx.cart_mut().update(&product_id, quantity) {
        UpdateOutcome::NotFound => {
            return Err(AppError::BadRequest(format!(
                "product {product_id} is not in the cart"
            )));
        }
        UpdateOutcome::Updated => {
            ctx.alerts_mut().success("Quantity updated");
        }
        UpdateOutcome::Removed => {
            ctx.alerts_mut().success("Removed from cart");
        }
    }
    summary(ctx);
    Ok(())
}

/// Empty the cart.
pub fn clear(ctx: &mut StorefrontContext) {
    ctx.cart_mut().clear();
    ctx.alerts_mut().success("Cart cleared");
    summary(ctx);
}

fn summary(ctx: &StorefrontContext) {
    let cart = ctx.cart();
    tracing::info!(
        count = cart.count(),
        total = %cart.total_price(),
        "Cart updated"
    );
}
