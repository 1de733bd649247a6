//! Core types for the stationery storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod line_item;
pub mod price;

pub use cart::{AddOutcome, Cart, QuantityPolicy, UpdateOutcome};
pub use id::*;
pub use line_item::{LineItem, NewLineItem};
pub use price::{CurrencyCode, Price, PriceError, ensure_non_negative, parse_unit_price};
