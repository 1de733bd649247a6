//! Subcommand implementations.

pub mod cart;
pub mod search;

use stationery_storefront::alerts::AlertLevel;
use stationery_storefront::state::StorefrontContext;

/// Print the session's alerts, newest first.
pub fn show_alerts(ctx: &StorefrontContext) {
    for alert in ctx.alerts().alerts() {
        match alert.level {
            AlertLevel::Success => tracing::info!("{}", alert.message),
            AlertLevel::Error => tracing::warn!("{}", alert.message),
        }
    }
}
