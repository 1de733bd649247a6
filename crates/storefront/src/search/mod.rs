//! Product search against the storefront server API.
//!
//! [`SearchClient`] issues `GET /api/search?q=...` and decodes the product
//! summaries the server returns. [`SearchDebouncer`] sits between keystrokes
//! and the client so a burst of typing produces at most one request.

mod debounce;

pub use debounce::{SearchDebouncer, SearchEvent};

use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stationery_core::{CurrencyCode, Price, ProductSlug};
use tracing::instrument;

use crate::api::{ApiClient, ApiError};

/// Path of the search endpoint.
pub const SEARCH_PATH: &str = "/api/search";

/// A product as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub slug: ProductSlug,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductSummary {
    /// Storefront path of the product page.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/product/{}", self.slug)
    }

    /// Price for display in `currency`.
    #[must_use]
    pub const fn display_price(&self, currency: CurrencyCode) -> Price {
        Price::new(self.price, currency)
    }
}

/// Search endpoint response body.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<ProductSummary>,
}

/// Something that can look products up by free text.
pub trait ProductSearch: Send + Sync + 'static {
    /// Search for products matching `query`.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ProductSummary>, ApiError>> + Send;
}

/// Search endpoint client.
#[derive(Debug, Clone)]
pub struct SearchClient {
    api: ApiClient,
}

impl SearchClient {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl ProductSearch for SearchClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<ProductSummary>, ApiError> {
        let response: SearchResponse = self.api.get(&search_path(query)).await?;
        tracing::debug!(results = response.results.len(), "Search completed");
        Ok(response.results)
    }
}

/// Request path for `query`, with the raw text URL-escaped.
#[must_use]
pub fn search_path(query: &str) -> String {
    format!("{SEARCH_PATH}?q={}", urlencoding::encode(query))
}
