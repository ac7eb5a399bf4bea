//! Mirror API implementations.
//!
//! # Design
//! - `Backend` performs exactly one request against one instance; failover
//!   lives in the gateway.
//! - The HTTP and fixture implementations honor the same contract so callers
//!   never branch on the active mode.

mod fixture;
mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pipedeck_config::ClientConfig;
use pipedeck_models::{Instance, Stream, SuggestionsResponse, TrendingVideo};

use crate::error::FetchResult;
use crate::query::Query;

pub use fixture::FixtureBackend;
pub use http::HttpBackend;

/// Operations served by a backend instance.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET {api_url}/trending?region={region}`.
    async fn trending(&self, instance: &Instance, region: &str) -> FetchResult<Vec<TrendingVideo>>;

    /// `GET {api_url}/suggestions?query={joinedQuery}`.
    async fn suggestions(
        &self,
        instance: &Instance,
        query: &Query,
    ) -> FetchResult<SuggestionsResponse>;

    /// `GET {api_url}/streams/{streamId}`.
    async fn stream(&self, instance: &Instance, stream_id: &str) -> FetchResult<Stream>;
}

/// Select the fixture backend when `fake_data` is set, HTTP otherwise.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be constructed.
pub fn backend_from_config(config: &ClientConfig) -> FetchResult<Arc<dyn Backend>> {
    if config.fake_data {
        tracing::info!(delay_ms = config.fake_delay_ms, "serving fixture data");
        return Ok(Arc::new(FixtureBackend::new(Duration::from_millis(
            config.fake_delay_ms,
        ))));
    }
    let backend = HttpBackend::with_timeout(Duration::from_secs(config.request_timeout_secs))?;
    Ok(Arc::new(backend))
}
