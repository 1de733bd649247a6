//! Dismissible success/error alerts.
//!
//! Alerts are listed newest first and disappear either when dismissed or when
//! [`AlertQueue::expire`] runs after the timeout has elapsed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Default time an alert stays visible.
pub const DEFAULT_ALERT_TIMEOUT: Duration = Duration::from_secs(5);

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Error,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A message shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: Uuid,
    pub level: AlertLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Visible alerts, newest first.
#[derive(Debug, Clone)]
pub struct AlertQueue {
    alerts: Vec<Alert>,
    timeout: Duration,
}

impl Default for AlertQueue {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_TIMEOUT)
    }
}

impl AlertQueue {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            alerts: Vec::new(),
            timeout,
        }
    }

    /// Show a success message. Returns the alert's id.
    pub fn success(&mut self, message: impl Into<String>) -> Uuid {
        self.push(AlertLevel::Success, message.into(), Utc::now())
    }

    /// Show an error message. Returns the alert's id.
    pub fn error(&mut self, message: impl Into<String>) -> Uuid {
        self.push(AlertLevel::Error, message.into(), Utc::now())
    }

    /// Show a message created at `created_at`.
    pub fn push(&mut self, level: AlertLevel, message: String, created_at: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        tracing::debug!(%id, %level, message = %message, "Alert shown");
        self.alerts.insert(
            0,
            Alert {
                id,
                level,
                message,
                created_at,
            },
        );
        id
    }

    /// Dismiss one alert. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|alert| alert.id != id);
        self.alerts.len() != before
    }

    /// Drop alerts that have been visible for at least the timeout.
    ///
    /// Returns the number of alerts removed.
    pub fn expire(&mut self, now: DateTime<Utc>) -> usize {
        // A timeout too large for chrono never expires anything.
        let Ok(timeout) = chrono::Duration::from_std(self.timeout) else {
            return 0;
        };
        let before = self.alerts.len();
        self.alerts
            .retain(|alert| now.signed_duration_since(alert.created_at) < timeout);
        before - self.alerts.len()
    }

    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
