//! In-memory cart state.
//!
//! `Cart` is the pure data half of the cart store: an ordered, id-unique list
//! of line items with derived totals. Persistence and change notification
//! live in the storefront crate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::line_item::{LineItem, NewLineItem};

/// How an explicit quantity update to zero or below is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuantityPolicy {
    /// Store the quantity exactly as given, even when it is not positive.
    #[default]
    Retain,
    /// Drop the line when its quantity is set to zero or below.
    RemoveNonPositive,
}

/// Result of adding a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended.
    Inserted,
    /// The quantity of an existing line was increased.
    Merged,
}

/// Result of setting a line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No line with that product ID exists.
    NotFound,
    /// The line's quantity was replaced.
    Updated,
    /// The line was removed because of `QuantityPolicy::RemoveNonPositive`.
    Removed,
}

/// Ordered sequence of line items keyed by product ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from a list of items, merging duplicate product IDs.
    ///
    /// The first occurrence of an ID keeps its position and fields; later
    /// duplicates only contribute their quantity.
    #[must_use]
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            match cart.position(&item.product_id) {
                Some(index) => {
                    if let Some(existing) = cart.items.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(item.quantity);
                    }
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line by product ID.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a product, merging into an existing line with the same ID.
    ///
    /// When the line already exists only its quantity changes; the name,
    /// price, image and category of the new request are ignored.
    pub fn add(&mut self, item: NewLineItem) -> AddOutcome {
        let quantity = i64::from(item.quantity.get());
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return AddOutcome::Merged;
        }

        self.items.push(LineItem::from(item));
        AddOutcome::Inserted
    }

    /// Remove the line with the given product ID, returning it if present.
    pub fn remove(&mut self, product_id: &ProductId) -> Option<LineItem> {
        let index = self.position(product_id)?;
        Some(self.items.remove(index))
    }

    /// Replace a line's quantity.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
        policy: QuantityPolicy,
    ) -> UpdateOutcome {
        let Some(index) = self.position(product_id) else {
            return UpdateOutcome::NotFound;
        };

        if quantity <= 0 && policy == QuantityPolicy::RemoveNonPositive {
            self.items.remove(index);
            return UpdateOutcome::Removed;
        }

        if let Some(line) = self.items.get_mut(index) {
            line.quantity = quantity;
        }
        UpdateOutcome::Updated
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of price × quantity over all lines, saturating at the `Decimal`
    /// bounds.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.line_total()))
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn count(&self) -> i64 {
        self.items
            .iter()
            .fold(0_i64, |acc, item| acc.saturating_add(item.quantity))
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| &item.product_id == product_id)
    }
}

impl From<Vec<LineItem>> for Cart {
    fn from(items: Vec<LineItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn hammer(quantity: u32) -> NewLineItem {
        NewLineItem::new("p1", "Hammer", Decimal::new(250, 0))
            .unwrap()
            .quantity(qty(quantity))
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(hammer(2)), AddOutcome::Inserted);

        let renamed = NewLineItem::new("p1", "Sledgehammer", Decimal::new(999, 0))
            .unwrap()
            .quantity(qty(3))
            .category("tools");
        assert_eq!(cart.add(renamed), AddOutcome::Merged);

        assert_eq!(cart.len(), 1);
        let line = cart.get(&ProductId::new("p1")).unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(line.name, "Hammer");
        assert_eq!(line.price, Decimal::new(250, 0));
        assert!(line.category.is_none());
        assert_eq!(cart.count(), 5);
        assert_eq!(cart.total(), Decimal::new(1250, 0));
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add(NewLineItem::new("b", "Pencil", Decimal::ONE).unwrap());
        cart.add(NewLineItem::new("a", "Eraser", Decimal::ONE).unwrap());
        cart.add(NewLineItem::new("b", "Pencil", Decimal::ONE).unwrap());

        let ids: Vec<&str> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_remove_then_add_creates_fresh_line() {
        let mut cart = Cart::new();
        cart.add(hammer(4));
        assert!(cart.remove(&ProductId::new("p1")).is_some());

        let cheaper = NewLineItem::new("p1", "Hammer v2", Decimal::new(100, 0)).unwrap();
        assert_eq!(cart.add(cheaper), AddOutcome::Inserted);

        let line = cart.get(&ProductId::new("p1")).unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.name, "Hammer v2");
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut cart = Cart::new();
        cart.add(hammer(1));
        assert!(cart.remove(&ProductId::new("nope")).is_none());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_set_quantity_unknown_is_noop() {
        let mut cart = Cart::new();
        cart.add(hammer(1));
        let before = cart.clone();

        let outcome = cart.set_quantity(&ProductId::new("unknown"), 5, QuantityPolicy::Retain);
        assert_eq!(outcome, UpdateOutcome::NotFound);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_quantity_retains_non_positive() {
        let mut cart = Cart::new();
        cart.add(hammer(2));

        let outcome = cart.set_quantity(&ProductId::new("p1"), 0, QuantityPolicy::Retain);
        assert_eq!(outcome, UpdateOutcome::Updated);
        assert_eq!(cart.get(&ProductId::new("p1")).unwrap().quantity, 0);
        assert_eq!(cart.count(), 0);

        cart.set_quantity(&ProductId::new("p1"), -2, QuantityPolicy::Retain);
        assert_eq!(cart.count(), -2);
        assert_eq!(cart.total(), Decimal::new(-500, 0));
    }

    #[test]
    fn test_set_quantity_remove_policy() {
        let mut cart = Cart::new();
        cart.add(hammer(2));

        let outcome = cart.set_quantity(
            &ProductId::new("p1"),
            0,
            QuantityPolicy::RemoveNonPositive,
        );
        assert_eq!(outcome, UpdateOutcome::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(hammer(2));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_totals_match_independent_sums() {
        let mut cart = Cart::new();
        cart.add(hammer(2));
        cart.add(
            NewLineItem::new("p2", "Nails", Decimal::new(125, 1))
                .unwrap()
                .quantity(qty(8)),
        );
        cart.add(NewLineItem::new("p3", "Tape", Decimal::new(75, 2)).unwrap());
        cart.set_quantity(&ProductId::new("p3"), 4, QuantityPolicy::Retain);
        cart.remove(&ProductId::new("p1"));
        cart.add(hammer(1));

        let expected_count: i64 = cart.items().iter().map(|i| i.quantity).sum();
        let expected_total: Decimal = cart
            .items()
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum();
        assert_eq!(cart.count(), expected_count);
        assert_eq!(cart.total(), expected_total);
        assert_eq!(cart.count(), 13);
        assert_eq!(cart.total(), Decimal::new(353, 0));
    }

    #[test]
    fn test_total_saturates_instead_of_overflowing() {
        let mut cart = Cart::new();
        cart.add(
            NewLineItem::new("gold", "Gold", Decimal::MAX)
                .unwrap()
                .quantity(qty(2)),
        );
        assert_eq!(cart.total(), Decimal::MAX);

        cart.add(hammer(1));
        assert_eq!(cart.total(), Decimal::MAX);

        cart.set_quantity(&ProductId::new("gold"), -2, QuantityPolicy::Retain);
        assert_eq!(cart.items()[0].line_total(), Decimal::MIN);
        assert_eq!(cart.total(), Decimal::MIN + Decimal::new(250, 0));
    }

    #[test]
    fn test_serde_as_plain_array_and_dedup() {
        let json = r#"[
            {"product_id": "p1", "name": "Hammer", "price": 250, "quantity": 1, "image_url": null, "category": null},
            {"product_id": "p1", "name": "Other", "price": 1, "quantity": 2}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.items()[0].name, "Hammer");

        let value = serde_json::to_value(&cart).unwrap();
        assert!(value.is_array());
    }
}
