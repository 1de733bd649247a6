//! Per-session storefront state.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::alerts::AlertQueue;
use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::search::{SearchClient, SearchDebouncer, SearchEvent};
use crate::storage::FileStorage;

/// Everything a storefront UI needs for one shopping session.
///
/// Built once and handed to the UI layer; there is no global cart.
#[derive(Debug)]
pub struct StorefrontContext {
    config: StorefrontConfig,
    cart: CartStore<FileStorage>,
    api: ApiClient,
    alerts: AlertQueue,
}

impl StorefrontContext {
    /// Create the session state and hydrate the cart from disk.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let api = ApiClient::new(config.base_url.clone(), &config.api)?;

        let storage = FileStorage::new(&config.cart.storage_path);
        let cart = CartStore::hydrate(storage, config.cart.key.as_str())
            .with_policy(config.cart.quantity_policy)
            .with_currency(config.cart.currency);

        let alerts = AlertQueue::new(config.alert_timeout);

        tracing::info!(
            base_url = %config.base_url,
            storage = %config.cart.storage_path.display(),
            lines = cart.items().len(),
            "Storefront context ready"
        );

        Ok(Self {
            config,
            cart,
            api,
            alerts,
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<FileStorage> {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore<FileStorage> {
        &mut self.cart
    }

    /// Get a reference to the server API client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn alerts(&self) -> &AlertQueue {
        &self.alerts
    }

    pub const fn alerts_mut(&mut self) -> &mut AlertQueue {
        &mut self.alerts
    }

    /// Search endpoint client sharing this session's API client.
    #[must_use]
    pub fn search_client(&self) -> SearchClient {
        SearchClient::new(self.api.clone())
    }

    /// Debouncer for a search box, using the configured delay and minimum
    /// query length.
    #[must_use]
    pub fn search_debouncer(
        &self,
    ) -> (
        SearchDebouncer<SearchClient>,
        mpsc::UnboundedReceiver<SearchEvent>,
    ) {
        SearchDebouncer::new(Arc::new(self.search_client()), self.config.search)
    }

    /// Report `error` and show it to the shopper.
    pub fn fail(&mut self, error: &AppError) {
        error.report();
        self.alerts.error(error.to_string());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;
    use std::sync::Mutex;
    use std::time::Duration;

    use rust_decimal::Decimal;
    use stationery_core::{CurrencyCode, NewLineItem, QuantityPolicy};
    use url::Url;

    use super::*;
    use crate::alerts::AlertLevel;
    use crate::config::{ApiConfig, CartConfig, SearchConfig};
    use crate::storage::KeyValueStorage;

    fn config(dir: &tempfile::TempDir) -> StorefrontConfig {
        StorefrontConfig {
            base_url: Url::parse("http://127.0.0.1:9/").unwrap(),
            cart: CartConfig {
                storage_path: dir.path().join("storage.json"),
                key: "cart".to_string(),
                quantity_policy: QuantityPolicy::RemoveNonPositive,
                currency: CurrencyCode::RUB,
            },
            api: ApiConfig::default(),
            search: SearchConfig::default(),
            alert_timeout: Duration::from_secs(5),
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_cart_survives_new_session() {
        let dir = tempfile::tempdir().unwrap();

        let mut ctx = StorefrontContext::new(config(&dir)).unwrap();
        assert!(ctx.cart().is_empty());
        ctx.cart_mut().add(
            NewLineItem::new("p1", "Hammer", Decimal::new(250, 0))
                .unwrap()
                .quantity(NonZeroU32::new(2).unwrap()),
        );
        drop(ctx);

        let ctx = StorefrontContext::new(config(&dir)).unwrap();
        assert_eq!(ctx.cart().count(), 2);
        assert_eq!(ctx.cart().total(), Decimal::new(500, 0));
        assert!(ctx.cart().storage().get("cart").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_storage_file_starts_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        std::fs::write(&config.cart.storage_path, "{not json").unwrap();

        let ctx = StorefrontContext::new(config).unwrap();
        assert!(ctx.cart().is_empty());
        assert_eq!(ctx.cart().total(), Decimal::ZERO);
    }

    #[test]
    fn test_unwritable_storage_keeps_cart_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir);
        // A directory can be neither read nor replaced as a storage file.
        config.cart.storage_path = dir.path().to_path_buf();

        let mut ctx = StorefrontContext::new(config).unwrap();
        assert!(ctx.cart().is_empty());

        let counts = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&counts);
        ctx.cart_mut()
            .subscribe(move |event| sink.lock().unwrap().push(event.count));

        ctx.cart_mut().add(
            NewLineItem::new("p1", "Hammer", Decimal::new(250, 0))
                .unwrap()
                .quantity(NonZeroU32::new(3).unwrap()),
        );

        assert_eq!(ctx.cart().count(), 3);
        assert_eq!(ctx.cart().total(), Decimal::new(750, 0));
        assert_eq!(*counts.lock().unwrap(), vec![3]);
        assert!(ctx.cart().persist().is_err());
    }

    #[test]
    fn test_configured_policy_applies() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = StorefrontContext::new(config(&dir)).unwrap();
        let item = NewLineItem::new("p1", "Hammer", Decimal::new(250, 0)).unwrap();
        let id = item.product_id.clone();
        ctx.cart_mut().add(item);

        ctx.cart_mut().update(&id, 0);
        assert!(ctx.cart().is_empty());
    }

    #[test]
    fn test_fail_shows_error_alert() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = StorefrontContext::new(config(&dir)).unwrap();

        ctx.fail(&AppError::BadRequest("quantity must be a number".to_string()));

        let alert = &ctx.alerts().alerts()[0];
        assert_eq!(alert.level, AlertLevel::Error);
        assert_eq!(alert.message, "Bad request: quantity must be a number");
    }

    #[tokio::test]
    async fn test_search_debouncer_uses_config() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = StorefrontContext::new(config(&dir)).unwrap();

        let (mut debouncer, mut rx) = ctx.search_debouncer();
        debouncer.input("a");
        assert_eq!(rx.recv().await.unwrap(), SearchEvent::Hidden);
    }
}
