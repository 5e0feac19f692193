//! Search coordination - debounced text search and category browsing.
//!
//! The coordinator runs as its own task. Input events arrive over a channel, catalog
//! lookups run as spawned fetches, and observers read [`SearchState`] through a
//! `watch` channel. Free text and category are mutually exclusive inputs: choosing
//! one clears the other.
//!
//! Typed text is dispatched only after the input has been quiet for the debounce
//! window. Category picks are dispatched at once. Every dispatch bumps a generation
//! counter and only the newest generation may write results, so a slow stale fetch
//! can never overwrite a newer answer.

use crate::{
    core::catalog::ProductCatalog,
    errors::CatalogError,
    models::Product,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Shown when a lookup succeeds with no products.
pub const NOTHING_FOUND_MESSAGE: &str = "Nothing found. Try another brand or category.";
/// Shown when a lookup fails for any reason.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading products. Please try again.";

/// Where the coordinator is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// No query
    #[default]
    Idle,
    /// Text received, waiting for the input to go quiet
    Debouncing,
    /// A lookup is in flight
    Loading,
    /// Results available
    Success,
    /// Lookup failed or found nothing
    Error,
}

/// Observable search state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    /// Raw text as typed
    pub query: String,
    /// Selected category; `None` whenever free text is active
    pub selected_category: Option<String>,
    /// Current phase
    pub phase: SearchPhase,
    /// True while the newest lookup is in flight
    pub is_loading: bool,
    /// User-facing error, if the last lookup failed or found nothing
    pub error_message: Option<String>,
    /// Products of the last successful lookup, in catalog order
    pub results: Vec<Product>,
}

#[derive(Debug)]
enum SearchEvent {
    TextChanged(String),
    CategorySelected(String),
}

#[derive(Debug)]
struct FetchOutcome {
    generation: u64,
    term: String,
    result: Result<Vec<Product>, CatalogError>,
}

/// Trims and lowercases a query the way the catalog expects it.
#[must_use]
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Handle to a running search coordinator. Dropping it stops the task.
#[derive(Debug)]
pub struct SearchCoordinator {
    events: mpsc::UnboundedSender<SearchEvent>,
    state: watch::Receiver<SearchState>,
    shutdown: CancellationToken,
}

impl SearchCoordinator {
    /// Starts a coordinator over `catalog` with the given debounce window.
    #[must_use]
    pub fn spawn(catalog: Arc<dyn ProductCatalog>, debounce: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState::default());
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let worker = SearchLoop {
            catalog,
            debounce,
            state: state_tx,
            results: results_tx,
            generation: 0,
            deadline: None,
            last_debounced: None,
        };
        tokio::spawn(worker.run(events_rx, results_rx, shutdown.clone()));

        Self {
            events: events_tx,
            state: state_rx,
            shutdown,
        }
    }

    /// Feeds a new value of the search text field.
    pub fn on_text_changed(&self, text: impl Into<String>) {
        self.send(SearchEvent::TextChanged(text.into()));
    }

    /// Selects a category, replacing any typed text.
    pub fn on_category_selected(&self, category: impl Into<String>) {
        self.send(SearchEvent::CategorySelected(category.into()));
    }

    fn send(&self, event: SearchEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!("Search coordinator is no longer running");
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    /// Stops the coordinator task. In-flight fetches finish but are ignored.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct SearchLoop {
    catalog: Arc<dyn ProductCatalog>,
    debounce: Duration,
    state: watch::Sender<SearchState>,
    results: mpsc::UnboundedSender<FetchOutcome>,
    generation: u64,
    deadline: Option<Instant>,
    last_debounced: Option<String>,
}

impl SearchLoop {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<SearchEvent>,
        mut outcomes: mpsc::UnboundedReceiver<FetchOutcome>,
        shutdown: CancellationToken,
    ) {
        tracing::debug!("Search coordinator started");

        loop {
            let sleep_until = self.deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                biased;

                () = shutdown.cancelled() => break,

                event = events.recv() => match event {
                    Some(SearchEvent::TextChanged(text)) => self.text_changed(text),
                    Some(SearchEvent::CategorySelected(category)) => self.category_selected(category),
                    None => break,
                },

                Some(outcome) = outcomes.recv() => self.apply(outcome),

                () = tokio::time::sleep_until(sleep_until), if self.deadline.is_some() => {
                    self.deadline = None;
                    self.debounce_elapsed();
                }
            }
        }

        tracing::debug!("Search coordinator stopped");
    }

    fn text_changed(&mut self, text: String) {
        if normalize_query(&text).is_empty() {
            // Text that was already empty clears nothing, so a category fetch survives it
            if normalize_query(&self.state.borrow().query).is_empty() {
                return;
            }

            // Clearing bypasses the debounce and invalidates anything in flight
            self.deadline = None;
            self.last_debounced = None;
            self.generation += 1;
            self.state.send_modify(|s| {
                s.query = text;
                s.phase = SearchPhase::Idle;
                s.is_loading = false;
                s.error_message = None;
                s.results.clear();
            });
            return;
        }

        self.deadline = Some(Instant::now() + self.debounce);
        self.state.send_modify(|s| {
            s.query = text;
            s.selected_category = None;
            s.phase = SearchPhase::Debouncing;
        });
    }

    fn debounce_elapsed(&mut self) {
        let term = normalize_query(&self.state.borrow().query);

        if self.last_debounced.as_deref() == Some(term.as_str()) {
            tracing::debug!("Query {:?} unchanged since last dispatch, not refetching", term);
            self.state.send_modify(|s| s.phase = settled_phase(s));
            return;
        }

        self.last_debounced = Some(term.clone());
        self.dispatch(term, false);
    }

    fn category_selected(&mut self, category: String) {
        self.deadline = None;
        self.last_debounced = None;

        let term = normalize_query(&category);
        if term.is_empty() {
            self.generation += 1;
            self.state.send_modify(|s| {
                s.query.clear();
                s.selected_category = None;
                s.phase = SearchPhase::Idle;
                s.is_loading = false;
                s.error_message = None;
                s.results.clear();
            });
            return;
        }

        self.state.send_modify(|s| {
            s.query.clear();
            s.selected_category = Some(category);
        });
        self.dispatch(term, true);
    }

    fn dispatch(&mut self, term: String, by_category: bool) {
        self.generation += 1;
        let generation = self.generation;
        tracing::debug!(
            "Dispatching lookup #{} for {:?} (by_category = {})",
            generation,
            term,
            by_category
        );

        self.state.send_modify(|s| {
            s.phase = SearchPhase::Loading;
            s.is_loading = true;
            s.error_message = None;
            s.results.clear();
        });

        let catalog = Arc::clone(&self.catalog);
        let results = self.results.clone();
        tokio::spawn(async move {
            let result = catalog.fetch(&term, by_category).await;
            // The coordinator may already be gone
            let _ = results.send(FetchOutcome {
                generation,
                term,
                result,
            });
        });
    }

    fn apply(&mut self, outcome: FetchOutcome) {
        if outcome.generation != self.generation {
            tracing::debug!(
                "Discarding stale lookup #{} for {:?} (current #{})",
                outcome.generation,
                outcome.term,
                self.generation
            );
            return;
        }

        self.state.send_modify(|s| {
            s.is_loading = false;
            match outcome.result {
                Ok(products) if products.is_empty() => {
                    s.phase = SearchPhase::Error;
                    s.error_message = Some(NOTHING_FOUND_MESSAGE.to_string());
                    s.results.clear();
                }
                Ok(products) => {
                    tracing::info!("Found {} products for {:?}", products.len(), outcome.term);
                    s.phase = SearchPhase::Success;
                    s.error_message = None;
                    s.results = products;
                }
                Err(e) => {
                    tracing::warn!("Lookup for {:?} failed: {}", outcome.term, e);
                    s.phase = SearchPhase::Error;
                    s.error_message = Some(LOAD_ERROR_MESSAGE.to_string());
                    s.results.clear();
                }
            }
        });
    }
}

fn settled_phase(state: &SearchState) -> SearchPhase {
    if state.is_loading {
        SearchPhase::Loading
    } else if state.error_message.is_some() {
        SearchPhase::Error
    } else if state.results.is_empty() {
        SearchPhase::Idle
    } else {
        SearchPhase::Success
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use tokio::time::sleep;

    fn start(catalog: &Arc<FakeCatalog>) -> SearchCoordinator {
        SearchCoordinator::spawn(
            Arc::clone(catalog) as Arc<dyn ProductCatalog>,
            Duration::from_millis(500),
        )
    }

    async fn wait_for_phase(coordinator: &SearchCoordinator, phase: SearchPhase) -> SearchState {
        let mut rx = coordinator.subscribe();
        rx.wait_for(|s| s.phase == phase).await.unwrap().clone()
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  NYX  "), "nyx");
        assert_eq!(normalize_query("\t"), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystroke_burst_fetches_once_for_last_text() {
        let catalog = Arc::new(FakeCatalog::new());
        let coordinator = start(&catalog);

        for (i, text) in ["m", "ma", "may", "mayb"].into_iter().enumerate() {
            if i > 0 {
                sleep(Duration::from_millis(100)).await;
            }
            coordinator.on_text_changed(text);
        }

        // Still inside the quiet window of the last keystroke
        sleep(Duration::from_millis(450)).await;
        assert!(catalog.calls().is_empty());
        assert_eq!(coordinator.state().phase, SearchPhase::Debouncing);

        let state = wait_for_phase(&coordinator, SearchPhase::Success).await;
        assert_eq!(catalog.calls(), vec![("mayb".to_string(), false)]);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.query, "mayb");

        sleep(Duration::from_secs(2)).await;
        assert_eq!(catalog.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_is_normalized_before_fetch() {
        let catalog = Arc::new(FakeCatalog::new());
        let coordinator = start(&catalog);

        coordinator.on_text_changed("  NYX ");
        wait_for_phase(&coordinator, SearchPhase::Success).await;
        assert_eq!(catalog.calls(), vec![("nyx".to_string(), false)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_result_is_nothing_found_error() {
        let catalog = Arc::new(FakeCatalog::new());
        catalog.respond("maybelline", Duration::ZERO, Ok(Vec::new()));
        let coordinator = start(&catalog);

        coordinator.on_text_changed("Maybelline");
        let state = wait_for_phase(&coordinator, SearchPhase::Error).await;

        assert_eq!(state.error_message.as_deref(), Some(NOTHING_FOUND_MESSAGE));
        assert!(state.results.is_empty());
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_is_generic_error() {
        let catalog = Arc::new(FakeCatalog::new());
        catalog.respond(
            "nyx",
            Duration::ZERO,
            Err(CatalogError::DecodeError {
                message: "bad body".to_string(),
            }),
        );
        let coordinator = start(&catalog);

        coordinator.on_text_changed("nyx");
        let state = wait_for_phase(&coordinator, SearchPhase::Error).await;
        assert_eq!(state.error_message.as_deref(), Some(LOAD_ERROR_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_clears_previous_results() {
        let catalog = Arc::new(FakeCatalog::new());
        catalog.respond(
            "blush",
            Duration::from_secs(1),
            Ok(vec![test_product(2, "Blush")]),
        );
        let coordinator = start(&catalog);

        coordinator.on_category_selected("lipstick");
        wait_for_phase(&coordinator, SearchPhase::Success).await;

        coordinator.on_category_selected("blush");
        let loading = wait_for_phase(&coordinator, SearchPhase::Loading).await;
        assert!(loading.is_loading);
        assert!(loading.results.is_empty());
        assert!(loading.error_message.is_none());

        let done = wait_for_phase(&coordinator, SearchPhase::Success).await;
        assert_eq!(done.results[0].name, "Blush");
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_dispatches_immediately_and_clears_text() {
        let catalog = Arc::new(FakeCatalog::new());
        let coordinator = start(&catalog);

        coordinator.on_text_changed("nyx");
        coordinator.on_category_selected("Lipstick");

        let state = wait_for_phase(&coordinator, SearchPhase::Success).await;
        assert_eq!(state.query, "");
        assert_eq!(state.selected_category.as_deref(), Some("Lipstick"));

        // The pending text debounce was cancelled
        sleep(Duration::from_secs(1)).await;
        assert_eq!(catalog.calls(), vec![("lipstick".to_string(), true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_clears_selected_category() {
        let catalog = Arc::new(FakeCatalog::new());
        let coordinator = start(&catalog);

        coordinator.on_category_selected("mascara");
        wait_for_phase(&coordinator, SearchPhase::Success).await;

        coordinator.on_text_changed("elf");
        let state = wait_for_phase(&coordinator, SearchPhase::Debouncing).await;
        assert!(state.selected_category.is_none());
        assert_eq!(state.query, "elf");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let catalog = Arc::new(FakeCatalog::new());
        catalog.respond(
            "lipstick",
            Duration::from_secs(2),
            Ok(vec![test_product(1, "Slow Lipstick")]),
        );
        catalog.respond(
            "blush",
            Duration::from_millis(100),
            Ok(vec![test_product(2, "Quick Blush")]),
        );
        let coordinator = start(&catalog);

        coordinator.on_category_selected("lipstick");
        sleep(Duration::from_millis(50)).await;
        coordinator.on_category_selected("blush");

        let state = wait_for_phase(&coordinator, SearchPhase::Success).await;
        assert_eq!(state.results[0].name, "Quick Blush");

        // Let the slow lookup land; it must not overwrite the newer answer
        sleep(Duration::from_secs(3)).await;
        let state = coordinator.state();
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].name, "Quick Blush");
        assert_eq!(state.selected_category.as_deref(), Some("blush"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_text_bypasses_debounce_and_drops_in_flight() {
        let catalog = Arc::new(FakeCatalog::new());
        catalog.respond("nyx", Duration::from_secs(1), Ok(vec![test_product(1, "Lip")]));
        let coordinator = start(&catalog);

        coordinator.on_text_changed("nyx");
        wait_for_phase(&coordinator, SearchPhase::Loading).await;

        coordinator.on_text_changed("");
        let state = wait_for_phase(&coordinator, SearchPhase::Idle).await;
        assert!(state.results.is_empty());
        assert!(state.error_message.is_none());
        assert!(!state.is_loading);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(coordinator.state().phase, SearchPhase::Idle);
        assert!(coordinator.state().results.is_empty());
        assert_eq!(catalog.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_echo_keeps_category_fetch() {
        let catalog = Arc::new(FakeCatalog::new());
        catalog.respond(
            "lipstick",
            Duration::from_millis(300),
            Ok(vec![test_product(1, "Matte Lipstick")]),
        );
        let coordinator = start(&catalog);

        coordinator.on_category_selected("lipstick");
        sleep(Duration::from_millis(10)).await;
        coordinator.on_text_changed("");

        let state = wait_for_phase(&coordinator, SearchPhase::Success).await;
        assert_eq!(state.selected_category.as_deref(), Some("lipstick"));
        assert_eq!(state.results[0].name, "Matte Lipstick");
        assert_eq!(catalog.calls(), vec![("lipstick".to_string(), true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_pending_text_never_fetches() {
        let catalog = Arc::new(FakeCatalog::new());
        let coordinator = start(&catalog);

        coordinator.on_text_changed("ny");
        sleep(Duration::from_millis(200)).await;
        coordinator.on_text_changed("");

        sleep(Duration::from_secs(2)).await;
        assert!(catalog.calls().is_empty());
        assert_eq!(coordinator.state().phase, SearchPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_debounced_text_is_not_refetched() {
        let catalog = Arc::new(FakeCatalog::new());
        let coordinator = start(&catalog);

        coordinator.on_text_changed("nyx");
        wait_for_phase(&coordinator, SearchPhase::Success).await;

        coordinator.on_text_changed("nyxx");
        sleep(Duration::from_millis(100)).await;
        coordinator.on_text_changed("nyx");

        sleep(Duration::from_secs(2)).await;
        assert_eq!(catalog.calls().len(), 1);
        assert_eq!(coordinator.state().phase, SearchPhase::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_processing() {
        let catalog = Arc::new(FakeCatalog::new());
        let coordinator = start(&catalog);

        coordinator.shutdown();
        sleep(Duration::from_millis(10)).await;
        coordinator.on_text_changed("nyx");

        sleep(Duration::from_secs(2)).await;
        assert!(catalog.calls().is_empty());
        assert_eq!(coordinator.state(), SearchState::default());
    }
}
