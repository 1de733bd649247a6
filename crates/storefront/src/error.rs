//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for callers that drive several
//! storefront components at once (the storefront context, the CLI). Each
//! component keeps its own error enum; `AppError` wraps them with `#[from]`.

use thiserror::Error;

use stationery_core::PriceError;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage scope could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Server API request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Invalid price input.
    #[error("Invalid price: {0}")]
    Price(#[from] PriceError),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error points at a fault outside the user's control.
    ///
    /// User-input problems are not worth a Sentry event.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Api(_))
    }

    /// Log the error and, for reportable errors, capture it to Sentry.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::error!(error = %self, "Operation failed");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error. Without an initialized Sentry client this is a no-op.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
