//! Search session runtime.
//!
//! # Design
//! - Every mutation goes through the reducer on a single `watch` store, so
//!   observers see each named action land.
//! - The single-flight guard and the staleness check run inside
//!   `send_if_modified`, making check-and-set atomic with respect to other
//!   dispatches.
//! - Keystrokes and submissions bump an intent counter; a result is stale
//!   when the counter moved while its request was in flight.
//! - The `fetching` flag is cleared by a drop guard, so an aborted query task
//!   still re-arms the session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use pipedeck_models::Instance;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::state::{SuggestionAction, SuggestionState};
use crate::debounce::Debouncer;
use crate::gateway::FetchGateway;
use crate::query::{Query, is_eligible};
use crate::registry::{InstanceList, RegistryState};
use crate::router::{Router, SearchRoute};

/// Drives one search box: debounced suggestion queries with failover,
/// staleness handling, and search submission.
pub struct SuggestionSession {
    inner: Arc<SessionInner>,
    debouncer: Debouncer,
}

struct SessionInner {
    gateway: FetchGateway,
    router: Arc<dyn Router>,
    store: watch::Sender<SuggestionState>,
    registry: Mutex<RegistryState>,
    in_flight: Mutex<JoinSet<()>>,
    intent: AtomicU64,
    debounce: Duration,
}

enum Claim {
    Busy,
    Ineligible,
    Claimed(u64),
}

enum Resolution {
    Published,
    Discarded,
    Closed,
    Requery { text: String, intent: u64 },
}

struct FetchingGuard<'a> {
    store: &'a watch::Sender<SuggestionState>,
}

impl Drop for FetchingGuard<'_> {
    fn drop(&mut self) {
        self.store
            .send_modify(|state| state.apply(SuggestionAction::SetFetching(false)));
    }
}

impl SuggestionSession {
    /// Session querying `instances` through `gateway`, handing submitted
    /// searches to `router` and waiting `debounce` after each keystroke.
    #[must_use]
    pub fn new(
        gateway: FetchGateway,
        instances: &InstanceList,
        router: Arc<dyn Router>,
        debounce: Duration,
    ) -> Self {
        let (store, _) = watch::channel(SuggestionState::default());
        Self {
            inner: Arc::new(SessionInner {
                gateway,
                router,
                store,
                registry: Mutex::new(RegistryState::seed(instances)),
                in_flight: Mutex::new(JoinSet::new()),
                intent: AtomicU64::new(0),
                debounce,
            }),
            debouncer: Debouncer::new(),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SuggestionState {
        self.inner.store.borrow().clone()
    }

    /// Receiver notified after every dispatched change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.inner.store.subscribe()
    }

    /// Apply a single action to the store.
    pub fn dispatch(&self, action: SuggestionAction) {
        self.inner.dispatch(action);
    }

    /// Apply several actions as one observable change.
    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = SuggestionAction>) {
        self.inner.dispatch_all(actions);
    }

    /// Record a keystroke and schedule a debounced query when eligible.
    ///
    /// Ineligible text clears the suggestions and cancels the pending query.
    pub fn input_changed(&self, text: &str) {
        self.inner.supersede([
            SuggestionAction::SetSearchValue(text.to_string()),
            SuggestionAction::SetSubmitted(false),
        ]);

        if !is_eligible(text) {
            self.inner
                .dispatch(SuggestionAction::SetSuggestions(Vec::new()));
            self.debouncer.cancel();
            return;
        }

        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        self.debouncer
            .schedule(self.inner.debounce, move || SessionInner::spawn_query(&inner, text));
    }

    /// Query suggestions for `text` immediately, bypassing the debouncer.
    ///
    /// The result is published unless the input changes or a search is
    /// submitted while the request is in flight. Returns without a request
    /// when another query is in flight.
    pub async fn run_query(&self, text: &str) {
        self.inner.run_query(text).await;
    }

    /// Submit `value` as a search and hand the route to the router.
    ///
    /// Returns `None` without side effects when `value` is not eligible.
    pub fn submit(&self, value: &str) -> Option<SearchRoute> {
        let query = Query::parse(value)?;
        self.debouncer.cancel();
        self.inner.supersede([
            SuggestionAction::SetSubmitted(true),
            SuggestionAction::SetSearchValue(value.to_string()),
            SuggestionAction::SetOpen(false),
        ]);

        let route = SearchRoute::for_query(&query);
        info!(route = %route, "search submitted");
        self.inner.router.push(route.as_str());
        Some(route)
    }

    /// Submit whatever is currently in the search box.
    pub fn submit_current(&self) -> Option<SearchRoute> {
        let value = self.inner.store.borrow().search_value.clone();
        self.submit(&value)
    }

    /// Close the suggestion panel, keeping its contents.
    pub fn dismiss(&self) {
        self.inner.dispatch(SuggestionAction::SetOpen(false));
    }

    /// Reopen a closed panel; returns whether the state changed.
    pub fn reopen(&self) -> bool {
        self.inner.store.send_if_modified(|state| {
            if state.open {
                return false;
            }
            state.apply(SuggestionAction::SetOpen(true));
            true
        })
    }

    /// Whether the search button should be offered.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.inner.store.borrow().can_submit()
    }

    /// Instance the next query will start from.
    #[must_use]
    pub fn current_instance(&self) -> Option<Instance> {
        self.inner.registry_snapshot().current().cloned()
    }

    /// Whether a debounced query is waiting to fire.
    #[must_use]
    pub fn query_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Cancel the pending debounce and abort any in-flight query.
    pub fn close(&self) {
        self.debouncer.cancel();
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .abort_all();
    }
}

impl Drop for SuggestionSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl SessionInner {
    fn dispatch(&self, action: SuggestionAction) {
        self.store.send_modify(|state| state.apply(action));
    }

    fn dispatch_all(&self, actions: impl IntoIterator<Item = SuggestionAction>) {
        self.store.send_modify(|state| {
            for action in actions {
                state.apply(action);
            }
        });
    }

    fn supersede(&self, actions: impl IntoIterator<Item = SuggestionAction>) {
        self.store.send_modify(|state| {
            self.intent.fetch_add(1, Ordering::SeqCst);
            for action in actions {
                state.apply(action);
            }
        });
    }

    fn registry_snapshot(&self) -> RegistryState {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember(&self, state: RegistryState) {
        *self.registry.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn spawn_query(inner: &Arc<Self>, text: String) {
        let task = Arc::clone(inner);
        let mut in_flight = inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while in_flight.try_join_next().is_some() {}
        in_flight.spawn(async move { task.run_query(&text).await });
    }

    fn claim(&self, text: &str) -> Claim {
        let mut claim = Claim::Busy;
        self.store.send_if_modified(|state| {
            if state.fetching {
                return false;
            }
            if is_eligible(text) {
                state.apply(SuggestionAction::SetFetching(true));
                claim = Claim::Claimed(self.intent.load(Ordering::SeqCst));
            } else {
                state.apply(SuggestionAction::SetOpen(false));
                claim = Claim::Ineligible;
            }
            true
        });
        claim
    }

    fn resolve(&self, intent: u64, text: &str, suggestions: Vec<String>) -> Resolution {
        let mut resolution = Resolution::Discarded;
        self.store.send_if_modified(|state| {
            if state.submitted {
                return false;
            }
            let latest = self.intent.load(Ordering::SeqCst);
            if latest == intent && !suggestions.is_empty() {
                state.apply(SuggestionAction::SetSuggestions(suggestions));
                state.apply(SuggestionAction::SetOpen(true));
                resolution = Resolution::Published;
                return true;
            }
            let current = if latest == intent {
                text.to_string()
            } else {
                state.search_value.clone()
            };
            if is_eligible(&current) {
                state.apply(SuggestionAction::SetOpen(true));
                resolution = Resolution::Requery {
                    text: current,
                    intent: latest,
                };
            } else {
                state.apply(SuggestionAction::SetOpen(false));
                resolution = Resolution::Closed;
            }
            true
        });
        resolution
    }

    async fn run_query(&self, text: &str) {
        let mut intent = match self.claim(text) {
            Claim::Busy => {
                debug!(query = text, "suggestion query already in flight");
                return;
            }
            Claim::Ineligible => return,
            Claim::Claimed(intent) => intent,
        };
        let _fetching = FetchingGuard { store: &self.store };

        let mut text = text.to_string();
        let mut registry = self.registry_snapshot();
        let mut remaining = self.gateway.budget_for(&registry);

        loop {
            let Some(query) = Query::parse(&text) else {
                self.dispatch(SuggestionAction::SetOpen(false));
                return;
            };

            let (response, serving) = match self.gateway.suggestions(&query, registry).await {
                Ok(found) => found,
                Err(err) => {
                    warn!(query = %text, error = %err, "suggestions unavailable");
                    self.store.send_if_modified(|state| {
                        if state.submitted {
                            return false;
                        }
                        state.apply(SuggestionAction::SetOpen(true));
                        true
                    });
                    return;
                }
            };

            match self.resolve(intent, &text, response.into_suggestions()) {
                Resolution::Published => {
                    self.remember(serving);
                    return;
                }
                Resolution::Discarded => {
                    debug!(query = %text, "search submitted, discarding suggestions");
                    return;
                }
                Resolution::Closed => {
                    debug!(query = %text, "input no longer eligible, closing panel");
                    return;
                }
                Resolution::Requery {
                    text: current,
                    intent: latest,
                } => {
                    debug!(query = %text, current = %current, "stale or empty suggestions");
                    remaining = remaining.saturating_sub(1);
                    registry = serving.advance();
                    text = current;
                    intent = latest;
                    if remaining == 0 {
                        warn!(query = %text, "suggestion retries exhausted");
                        return;
                    }
                }
            }
        }
    }
}
