//! Offline backend serving embedded sample payloads.

use std::time::Duration;

use async_trait::async_trait;
use pipedeck_models::{Instance, Stream, SuggestionsResponse, TrendingVideo};
use serde::de::DeserializeOwned;

use super::Backend;
use crate::error::{FetchError, FetchResult};
use crate::query::Query;

const TRENDING: &str = include_str!("../../fixtures/trending.json");
const STREAM: &str = include_str!("../../fixtures/stream.json");
const SUGGESTIONS: &str = include_str!("../../fixtures/suggestions.json");

const FIXTURE_SOURCE: &str = "fixture";

/// Backend returning bundled data after an artificial delay.
///
/// The instance argument is ignored; every instance answers identically.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureBackend {
    delay: Duration,
}

impl FixtureBackend {
    /// Backend that waits `delay` before answering each request.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Configured artificial latency.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

fn decode<T: DeserializeOwned>(raw: &str) -> FetchResult<T> {
    serde_json::from_str(raw).map_err(|err| FetchError::BadResponse {
        instance: FIXTURE_SOURCE.to_string(),
        reason: err.to_string(),
    })
}

#[async_trait]
impl Backend for FixtureBackend {
    async fn trending(&self, _instance: &Instance, _region: &str) -> FetchResult<Vec<TrendingVideo>> {
        self.wait().await;
        decode(TRENDING)
    }

    async fn suggestions(
        &self,
        _instance: &Instance,
        query: &Query,
    ) -> FetchResult<SuggestionsResponse> {
        self.wait().await;
        let suggestions: Vec<String> = decode(SUGGESTIONS)?;
        Ok(SuggestionsResponse(query.as_str().to_string(), suggestions))
    }

    async fn stream(&self, _instance: &Instance, _stream_id: &str) -> FetchResult<Stream> {
        self.wait().await;
        decode(STREAM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn instance() -> Instance {
        Instance::new("offline", Url::parse("https://offline.test").expect("url"))
    }

    #[tokio::test]
    async fn embedded_payloads_decode() {
        let backend = FixtureBackend::default();
        let videos = backend
            .trending(&instance(), "US")
            .await
            .expect("trending fixture");
        assert_eq!(videos.len(), 3);
        assert!(videos.iter().all(|video| video.video_id().is_some()));

        let stream = backend
            .stream(&instance(), "8PfSXr3nBHo")
            .await
            .expect("stream fixture");
        assert!(stream.manifest_url().is_some_and(|url| url.ends_with(".mpd")));
        assert_eq!(stream.audio_streams.len(), 1);
    }

    #[tokio::test]
    async fn suggestions_echo_the_query() {
        let query = Query::parse("home lab").expect("eligible");
        let response = FixtureBackend::default()
            .suggestions(&instance(), &query)
            .await
            .expect("suggestions fixture");
        assert_eq!(response.query(), "home lab");
        assert!(!response.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied_before_answering() {
        let backend = FixtureBackend::new(Duration::from_millis(500));
        let started = tokio::time::Instant::now();
        backend
            .trending(&instance(), "US")
            .await
            .expect("trending fixture");
        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
