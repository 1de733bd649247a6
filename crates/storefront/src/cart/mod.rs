//! Persisted cart store.
//!
//! `CartStore` owns the session's [`Cart`], mirrors it into a
//! [`KeyValueStorage`] scope under a single key after every mutation, and
//! notifies the UI layer:
//!
//! - the registered [`CountDisplay`] (the cart badge) receives the new item
//!   count, if one is registered
//! - every subscribed listener receives a [`CartEvent`]
//!
//! Hydration never fails: missing or unreadable data starts an empty cart.
//!
//! # Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use stationery_core::NewLineItem;
//! use stationery_storefront::cart::CartStore;
//! use stationery_storefront::storage::MemoryStorage;
//!
//! let mut store = CartStore::hydrate(MemoryStorage::new(), "cart");
//! let hammer = NewLineItem::new("p1", "Hammer", Decimal::new(250, 0)).unwrap();
//! store.add(hammer);
//! assert_eq!(store.count(), 1);
//! ```

use std::fmt;

use rust_decimal::Decimal;
use stationery_core::{
    AddOutcome, Cart, CurrencyCode, LineItem, NewLineItem, Price, ProductId, QuantityPolicy,
    UpdateOutcome,
};

use crate::error::add_breadcrumb;
use crate::storage::{KeyValueStorage, StorageError};

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Display target for the cart item count (e.g., the navbar badge).
pub trait CountDisplay: Send {
    /// Show the new item count.
    fn set_count(&mut self, count: i64);
}

impl<F> CountDisplay for F
where
    F: FnMut(i64) + Send,
{
    fn set_count(&mut self, count: i64) {
        self(count);
    }
}

/// What a mutation did to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    Added {
        product_id: ProductId,
        outcome: AddOutcome,
    },
    Removed {
        product_id: ProductId,
        found: bool,
    },
    Updated {
        product_id: ProductId,
        quantity: i64,
        outcome: UpdateOutcome,
    },
    Cleared,
    /// The cart was re-read from storage.
    Reloaded,
}

/// Change notification delivered to subscribed listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEvent {
    pub change: CartChange,
    /// Item count after the change.
    pub count: i64,
    /// Cart total after the change.
    pub total: Decimal,
}

type Listener = Box<dyn FnMut(&CartEvent) + Send>;

/// The session's cart, mirrored to a storage scope.
pub struct CartStore<S> {
    storage: S,
    key: String,
    cart: Cart,
    policy: QuantityPolicy,
    currency: CurrencyCode,
    display: Option<Box<dyn CountDisplay>>,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Create a store and hydrate it from `storage[key]`.
    ///
    /// Absent or unparseable data yields an empty cart; the problem is
    /// logged, never returned.
    pub fn hydrate(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = load_cart(&storage, &key);
        tracing::debug!(key = %key, lines = cart.len(), "Cart hydrated");

        Self {
            storage,
            key,
            cart,
            policy: QuantityPolicy::default(),
            currency: CurrencyCode::default(),
            display: None,
            listeners: Vec::new(),
        }
    }

    /// Set how quantity updates to zero or below are handled.
    #[must_use]
    pub const fn with_policy(mut self, policy: QuantityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the currency totals are reported in.
    #[must_use]
    pub const fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    /// Register the count display target, replacing any previous one.
    ///
    /// The display immediately receives the current count.
    pub fn set_display(&mut self, display: impl CountDisplay + 'static) {
        let mut display: Box<dyn CountDisplay> = Box::new(display);
        display.set_count(self.cart.count());
        self.display = Some(display);
    }

    /// Unregister the count display target.
    pub fn clear_display(&mut self) {
        self.display = None;
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&mut self, listener: impl FnMut(&CartEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Add a product, or increase the quantity of its existing line.
    ///
    /// Always persists and notifies.
    pub fn add(&mut self, item: NewLineItem) -> AddOutcome {
        let product_id = item.product_id.clone();
        let outcome = self.cart.add(item);
        add_breadcrumb(
            "cart",
            "Added item to cart",
            Some(&[("product_id", product_id.as_str())]),
        );
        self.commit(CartChange::Added {
            product_id,
            outcome,
        });
        outcome
    }

    /// Remove a product's line.
    ///
    /// Persists and notifies even when the product was not in the cart.
    pub fn remove(&mut self, product_id: &ProductId) -> Option<LineItem> {
        let removed = self.cart.remove(product_id);
        add_breadcrumb(
            "cart",
            "Removed item from cart",
            Some(&[("product_id", product_id.as_str())]),
        );
        self.commit(CartChange::Removed {
            product_id: product_id.clone(),
            found: removed.is_some(),
        });
        removed
    }

    /// Set a line's quantity.
    ///
    /// Unknown products are a silent no-op: nothing is persisted and no
    /// notification is sent.
    pub fn update(&mut self, product_id: &ProductId, quantity: i64) -> UpdateOutcome {
        let outcome = self.cart.set_quantity(product_id, quantity, self.policy);
        if outcome == UpdateOutcome::NotFound {
            tracing::debug!(product_id = %product_id, "Ignoring update for product not in cart");
            return outcome;
        }

        let quantity_str = quantity.to_string();
        add_breadcrumb(
            "cart",
            "Updated cart quantity",
            Some(&[
                ("product_id", product_id.as_str()),
                ("quantity", quantity_str.as_str()),
            ]),
        );
        self.commit(CartChange::Updated {
            product_id: product_id.clone(),
            quantity,
            outcome,
        });
        outcome
    }

    /// Remove every line. Persists and notifies.
    pub fn clear(&mut self) {
        self.cart.clear();
        add_breadcrumb("cart", "Cleared cart", None);
        self.commit(CartChange::Cleared);
    }

    /// Re-read the cart from storage, picking up writes made by another
    /// session sharing the same scope. Notifies, does not persist.
    pub fn reload(&mut self) {
        self.cart = load_cart(&self.storage, &self.key);
        self.notify(CartChange::Reloaded);
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// Cart total as a displayable price.
    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::new(self.cart.total(), self.currency)
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn count(&self) -> i64 {
        self.cart.count()
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.cart.get(product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// The in-memory cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The storage key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The backing storage scope.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Write the full line-item list to storage, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the storage write fails.
    pub fn persist(&self) -> Result<(), StorageError> {
        let body = serde_json::to_string(self.cart.items())?;
        self.storage.set(&self.key, &body)
    }

    /// Push the current count to the display target (if any) and deliver
    /// `change` to every listener.
    pub fn notify(&mut self, change: CartChange) {
        let count = self.cart.count();
        if let Some(display) = self.display.as_mut() {
            display.set_count(count);
        }

        if self.listeners.is_empty() {
            return;
        }

        let event = CartEvent {
            change,
            count,
            total: self.cart.total(),
        };
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn commit(&mut self, change: CartChange) {
        if let Err(e) = self.persist() {
            tracing::error!(key = %self.key, error = %e, "Failed to persist cart");
        }
        self.notify(change);
    }
}

impl<S: fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("storage", &self.storage)
            .field("key", &self.key)
            .field("cart", &self.cart)
            .field("policy", &self.policy)
            .field("currency", &self.currency)
            .field("has_display", &self.display.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Read the persisted cart, degrading to an empty cart on any failure.
fn load_cart<S: KeyValueStorage>(storage: &S, key: &str) -> Cart {
    match storage.get(key) {
        Ok(Some(raw)) => serde_json::from_str::<Cart>(&raw).unwrap_or_else(|e| {
            tracing::warn!(key = %key, error = %e, "Stored cart is unreadable, starting empty");
            Cart::new()
        }),
        Ok(None) => Cart::new(),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Failed to read stored cart, starting empty");
            Cart::new()
        }
    }
}
