//! Keystroke debouncing for product search.
//!
//! Each call to [`SearchDebouncer::input`] cancels the previously armed timer
//! and arms a new one, so only the last input of a burst reaches the server.
//! Once a timer fires its request runs detached: later keystrokes never cancel
//! an in-flight request, and when responses arrive out of order the last one
//! to arrive is the one the UI ends up showing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{ProductSearch, ProductSummary};
use crate::config::SearchConfig;

/// What the search dropdown should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// Show these results for `query`.
    Results {
        query: String,
        results: Vec<ProductSummary>,
    },
    /// Hide the dropdown.
    Hidden,
}

/// Turns raw search-box input into at most one request per typing burst.
pub struct SearchDebouncer<S> {
    searcher: Arc<S>,
    config: SearchConfig,
    events: mpsc::UnboundedSender<SearchEvent>,
    pending: Option<JoinHandle<()>>,
}

impl<S: ProductSearch> SearchDebouncer<S> {
    /// Create a debouncer and the receiver its events are delivered on.
    #[must_use]
    pub fn new(
        searcher: Arc<S>,
        config: SearchConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            searcher,
            config,
            events,
            pending: None,
        };
        (debouncer, rx)
    }

    /// Handle the current contents of the search box.
    ///
    /// Input shorter than the configured minimum (after trimming) cancels the
    /// pending timer and hides the results.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn input(&mut self, text: &str) {
        self.cancel_pending();

        let query = text.trim();
        if query.chars().count() < self.config.min_chars {
            self.hide();
            return;
        }

        let query = query.to_string();
        let searcher = Arc::clone(&self.searcher);
        let events = self.events.clone();
        let delay = self.config.debounce;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(perform_search(searcher, events, query));
        }));
    }

    /// Hide the results (e.g., the user clicked outside the search box).
    pub fn hide(&self) {
        // A closed receiver means nobody is showing results any more.
        let _ = self.events.send(SearchEvent::Hidden);
    }

    /// Cancel the armed timer, if any. In-flight requests are unaffected.
    pub fn cancel_pending(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }

    /// Whether a timer is armed and has not fired yet.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl<S> Drop for SearchDebouncer<S> {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }
}

impl<S> std::fmt::Debug for SearchDebouncer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchDebouncer")
            .field("config", &self.config)
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

async fn perform_search<S: ProductSearch>(
    searcher: Arc<S>,
    events: mpsc::UnboundedSender<SearchEvent>,
    query: String,
) {
    match searcher.search(&query).await {
        Ok(results) => {
            let _ = events.send(SearchEvent::Results { query, results });
        }
        Err(e) => {
            tracing::error!(query = %query, error = %e, "Search failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use rust_decimal::Decimal;
    use stationery_core::ProductSlug;
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;
    use crate::api::ApiError;

    /// Records queries and answers after a per-query delay.
    #[derive(Default)]
    struct FakeSearch {
        queries: Mutex<Vec<String>>,
        delays: Vec<(&'static str, Duration)>,
        fail: bool,
    }

    impl FakeSearch {
        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl ProductSearch for FakeSearch {
        async fn search(&self, query: &str) -> Result<Vec<ProductSummary>, ApiError> {
            self.queries.lock().unwrap().push(query.to_string());

            let delay = self
                .delays
                .iter()
                .find(|(q, _)| *q == query)
                .map_or(Duration::from_millis(10), |(_, d)| *d);
            tokio::time::sleep(delay).await;

            if self.fail {
                return Err(ApiError::Status {
                    status: 500,
                    message: String::new(),
                });
            }

            Ok(vec![ProductSummary {
                slug: ProductSlug::new(query.replace(' ', "-")),
                name: query.to_string(),
                price: Decimal::new(100, 0),
                image_url: None,
            }])
        }
    }

    fn config() -> SearchConfig {
        SearchConfig::default()
    }

    fn result_query(event: SearchEvent) -> String {
        match event {
            SearchEvent::Results { query, .. } => query,
            SearchEvent::Hidden => panic!("expected results, got Hidden"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_sends_one_request_for_last_input() {
        let searcher = Arc::new(FakeSearch::default());
        let (mut debouncer, mut rx) = SearchDebouncer::new(Arc::clone(&searcher), config());

        debouncer.input("pe");
        debouncer.input("pen");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.input("penc ");
        assert!(debouncer.has_pending());

        let event = rx.recv().await.unwrap();
        assert_eq!(result_query(event), "penc");

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(searcher.queries(), vec!["penc".to_string()]);
        assert!(!debouncer.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_waits_for_quiet_period() {
        let searcher = Arc::new(FakeSearch::default());
        let (mut debouncer, _rx) = SearchDebouncer::new(Arc::clone(&searcher), config());

        debouncer.input("pen");
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(searcher.queries().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(searcher.queries(), vec!["pen".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_input_hides_and_cancels_pending() {
        let searcher = Arc::new(FakeSearch::default());
        let (mut debouncer, mut rx) = SearchDebouncer::new(Arc::clone(&searcher), config());

        debouncer.input("pen");
        debouncer.input(" p ");
        assert_eq!(rx.recv().await.unwrap(), SearchEvent::Hidden);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(searcher.queries().is_empty());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_chars_counts_characters_not_bytes() {
        let searcher = Arc::new(FakeSearch::default());
        let (mut debouncer, mut rx) = SearchDebouncer::new(Arc::clone(&searcher), config());

        // One Cyrillic letter is two bytes but still too short.
        debouncer.input("р");
        assert_eq!(rx.recv().await.unwrap(), SearchEvent::Hidden);

        debouncer.input("ру");
        assert_eq!(result_query(rx.recv().await.unwrap()), "ру");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_not_emitted() {
        let searcher = Arc::new(FakeSearch {
            fail: true,
            ..FakeSearch::default()
        });
        let (mut debouncer, mut rx) = SearchDebouncer::new(Arc::clone(&searcher), config());

        debouncer.input("pen");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(searcher.queries(), vec!["pen".to_string()]);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_request_is_not_cancelled_and_last_arrival_wins() {
        let searcher = Arc::new(FakeSearch {
            delays: vec![
                ("slow", Duration::from_millis(500)),
                ("fast", Duration::from_millis(10)),
            ],
            ..FakeSearch::default()
        });
        let (mut debouncer, mut rx) = SearchDebouncer::new(Arc::clone(&searcher), config());

        debouncer.input("slow");
        // Timer fires at 300ms; the slow request is then in flight until 800ms.
        tokio::time::sleep(Duration::from_millis(350)).await;
        debouncer.input("fast");

        let first = result_query(rx.recv().await.unwrap());
        let second = result_query(rx.recv().await.unwrap());
        assert_eq!(first, "fast");
        assert_eq!(second, "slow");
        assert_eq!(
            searcher.queries(),
            vec!["slow".to_string(), "fast".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hide_and_drop() {
        let searcher = Arc::new(FakeSearch::default());
        let (mut debouncer, mut rx) = SearchDebouncer::new(Arc::clone(&searcher), config());

        debouncer.input("pen");
        debouncer.hide();
        assert_eq!(rx.recv().await.unwrap(), SearchEvent::Hidden);

        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(searcher.queries().is_empty());
    }
}
