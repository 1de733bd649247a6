//! Cart line items.
//!
//! A line item snapshots the product's name and unit price at the moment it
//! was first added; later adds of the same product only bump the quantity.

use std::num::NonZeroU32;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::id::ProductId;
use super::price::{PriceError, ensure_non_negative};

/// One product entry in the cart.
///
/// Field names match the persisted storage format, so carts written by
/// earlier versions of the storefront hydrate unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique key within the cart.
    #[serde(deserialize_with = "deserialize_product_id")]
    pub product_id: ProductId,
    /// Display label at time of add.
    pub name: String,
    /// Unit price at time of add. Written as a JSON number when an `f64`
    /// holds it exactly, otherwise as a decimal string; read from either.
    #[serde(serialize_with = "serialize_price")]
    pub price: Decimal,
    /// Signed so that an explicit quantity update to zero or below can be
    /// recorded as-is.
    pub quantity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl LineItem {
    /// Unit price multiplied by quantity, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

impl From<NewLineItem> for LineItem {
    fn from(item: NewLineItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            quantity: i64::from(item.quantity.get()),
            image_url: item.image_url,
            category: item.category,
        }
    }
}

/// Arguments for adding a product to the cart.
///
/// Quantity defaults to one; image and category default to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: NonZeroU32,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl NewLineItem {
    /// Create an add request for a single unit of a product.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `price` is below zero.
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
    ) -> Result<Self, PriceError> {
        Ok(Self {
            product_id: product_id.into(),
            name: name.into(),
            price: ensure_non_negative(price)?,
            quantity: NonZeroU32::MIN,
            image_url: None,
            category: None,
        })
    }

    /// Set the quantity to add.
    #[must_use]
    pub const fn quantity(mut self, quantity: NonZeroU32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the product image URL.
    #[must_use]
    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Set the product category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Write a price as a JSON number only if reading it back yields the same
/// value; prices with more significant digits than an `f64` carries are
/// written as strings.
fn serialize_price<S>(price: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match price.to_f64() {
        Some(number) if Decimal::from_str(&number.to_string()).is_ok_and(|d| d == *price) => {
            serializer.serialize_f64(number)
        }
        _ => serializer.serialize_str(&price.to_string()),
    }
}

/// Accept product IDs persisted either as strings or as bare numbers.
fn deserialize_product_id<'de, D>(deserializer: D) -> Result<ProductId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => ProductId::new(s),
        RawId::Number(n) => ProductId::new(n.to_string()),
    })
}
