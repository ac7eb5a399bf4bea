//! Fetch-with-failover over the instance registry.
//!
//! # Design
//! - The failover loop is a free function generic over the attempted
//!   operation, so session code and tests can drive it with any closure.
//! - The registry state is threaded by value and handed back on success; the
//!   caller decides whether to remember it.
//! - The attempt budget is always finite and at least one.

use std::future::Future;
use std::sync::Arc;

use pipedeck_config::ClientConfig;
use pipedeck_models::{Instance, Stream, SuggestionsResponse, TrendingVideo};
use tracing::{debug, instrument, warn};

use crate::backend::{Backend, backend_from_config};
use crate::error::{FetchError, FetchResult};
use crate::query::Query;
use crate::registry::RegistryState;

/// Run `operation` against the current instance, advancing on recoverable
/// failures until it succeeds or `max_attempts` attempts have been spent.
///
/// A budget of zero is treated as one attempt.
///
/// # Errors
///
/// - [`FetchError::NoInstances`] when `state` has no candidates; `operation`
///   is never called.
/// - [`FetchError::AllInstancesUnavailable`] when the budget runs out, carrying
///   the last underlying failure.
/// - Any non-recoverable error returned by `operation`, unchanged.
pub async fn fetch_with_failover<T, F, Fut>(
    mut operation: F,
    state: RegistryState,
    max_attempts: usize,
) -> FetchResult<(T, RegistryState)>
where
    F: FnMut(Instance) -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let budget = max_attempts.max(1);
    let mut state = state;
    let mut attempts = 0;

    loop {
        let Some(instance) = state.current().cloned() else {
            return Err(FetchError::NoInstances);
        };
        attempts += 1;
        debug!(instance = %instance.name, attempt = attempts, budget, "attempting instance");

        match operation(instance).await {
            Ok(value) => return Ok((value, state)),
            Err(err) if err.is_recoverable() => {
                if attempts >= budget {
                    warn!(attempts, error = %err, "attempt budget exhausted");
                    return Err(FetchError::AllInstancesUnavailable {
                        attempts,
                        last: Box::new(err),
                    });
                }
                warn!(
                    instance = err.instance().unwrap_or_default(),
                    error = %err,
                    "instance failed, failing over"
                );
                state = state.advance();
            }
            Err(err) => return Err(err),
        }
    }
}

/// Typed mirror operations with failover.
#[derive(Clone)]
pub struct FetchGateway {
    backend: Arc<dyn Backend>,
    max_attempts: Option<usize>,
}

impl FetchGateway {
    /// Gateway whose budget defaults to the registry length.
    #[must_use]
    pub const fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            max_attempts: None,
        }
    }

    /// Override the attempt budget for every sequence.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Build the backend selected by `config` and apply its attempt budget.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> FetchResult<Self> {
        let gateway = Self::new(backend_from_config(config)?);
        Ok(match config.max_attempts {
            Some(max_attempts) => gateway.with_max_attempts(max_attempts),
            None => gateway,
        })
    }

    /// Attempt budget for one sequence over `state`.
    #[must_use]
    pub fn budget_for(&self, state: &RegistryState) -> usize {
        self.max_attempts.unwrap_or_else(|| state.len()).max(1)
    }

    /// Trending videos for `region`.
    ///
    /// # Errors
    ///
    /// See [`fetch_with_failover`].
    #[instrument(name = "gateway.trending", skip(self, state), fields(instances = state.len()))]
    pub async fn trending(
        &self,
        region: &str,
        state: RegistryState,
    ) -> FetchResult<(Vec<TrendingVideo>, RegistryState)> {
        let budget = self.budget_for(&state);
        let backend = &self.backend;
        fetch_with_failover(
            |instance| async move { backend.trending(&instance, region).await },
            state,
            budget,
        )
        .await
    }

    /// Autocomplete suggestions for `query`.
    ///
    /// # Errors
    ///
    /// See [`fetch_with_failover`].
    #[instrument(
        name = "gateway.suggestions",
        skip(self, query, state),
        fields(query = query.as_str(), instances = state.len())
    )]
    pub async fn suggestions(
        &self,
        query: &Query,
        state: RegistryState,
    ) -> FetchResult<(SuggestionsResponse, RegistryState)> {
        let budget = self.budget_for(&state);
        let backend = &self.backend;
        fetch_with_failover(
            |instance| async move { backend.suggestions(&instance, query).await },
            state,
            budget,
        )
        .await
    }

    /// Stream metadata for `stream_id`.
    ///
    /// # Errors
    ///
    /// See [`fetch_with_failover`].
    #[instrument(name = "gateway.stream", skip(self, state), fields(instances = state.len()))]
    pub async fn stream(
        &self,
        stream_id: &str,
        state: RegistryState,
    ) -> FetchResult<(Stream, RegistryState)> {
        let budget = self.budget_for(&state);
        let backend = &self.backend;
        fetch_with_failover(
            |instance| async move { backend.stream(&instance, stream_id).await },
            state,
            budget,
        )
        .await
    }
}
