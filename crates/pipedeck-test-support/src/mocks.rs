//! Scripted backend and recording collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use pipedeck_core::{Backend, FetchError, FetchResult, HighlightSink, Query, Router};
use pipedeck_models::{Instance, Stream, SuggestionsResponse, TrendingVideo};

/// Operation recorded by [`ScriptedBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `/trending`.
    Trending,
    /// `/suggestions`.
    Suggestions,
    /// `/streams/{id}`.
    Stream,
}

/// One request observed by [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Name of the instance that was asked.
    pub instance: String,
    /// Operation requested.
    pub operation: Operation,
    /// Region, query text, or stream id.
    pub argument: String,
}

/// In-memory backend with per-instance failures and per-argument delays.
///
/// Failing instances answer `503`. Suggestions echo the query and return the
/// list scripted for its exact text, falling back to the default list.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    failing: HashSet<String>,
    suggestions: HashMap<String, Vec<String>>,
    default_suggestions: Vec<String>,
    trending: Vec<TrendingVideo>,
    stream: Option<Stream>,
    delays: HashMap<String, Duration>,
    delay: Duration,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    /// Backend where every instance succeeds with empty data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make instance `name` fail every request.
    #[must_use]
    pub fn fail_instance(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Answer `query` with `suggestions`.
    #[must_use]
    pub fn with_suggestions(mut self, query: &str, suggestions: &[&str]) -> Self {
        self.suggestions.insert(
            query.to_string(),
            suggestions.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Answer unscripted queries with `suggestions`.
    #[must_use]
    pub fn with_default_suggestions(mut self, suggestions: &[&str]) -> Self {
        self.default_suggestions = suggestions.iter().map(ToString::to_string).collect();
        self
    }

    /// Answer trending requests with `videos`.
    #[must_use]
    pub fn with_trending(mut self, videos: Vec<TrendingVideo>) -> Self {
        self.trending = videos;
        self
    }

    /// Answer stream requests with `stream`; without one they fail with `404`.
    #[must_use]
    pub fn with_stream(mut self, stream: Stream) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Delay requests whose argument equals `argument`.
    #[must_use]
    pub fn delay_for(mut self, argument: &str, delay: Duration) -> Self {
        self.delays.insert(argument.to_string(), delay);
        self
    }

    /// Delay every request without a specific delay.
    #[must_use]
    pub const fn delay_all(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Requests observed so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests of `operation` observed so far.
    #[must_use]
    pub fn calls_for(&self, operation: Operation) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.operation == operation)
            .collect()
    }

    async fn observe(
        &self,
        instance: &Instance,
        operation: Operation,
        argument: &str,
    ) -> FetchResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                instance: instance.name.clone(),
                operation,
                argument: argument.to_string(),
            });

        let delay = self.delays.get(argument).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&instance.name) {
            return Err(FetchError::BadStatus {
                instance: instance.api_url.to_string(),
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn trending(&self, instance: &Instance, region: &str) -> FetchResult<Vec<TrendingVideo>> {
        self.observe(instance, Operation::Trending, region).await?;
        Ok(self.trending.clone())
    }

    async fn suggestions(
        &self,
        instance: &Instance,
        query: &Query,
    ) -> FetchResult<SuggestionsResponse> {
        self.observe(instance, Operation::Suggestions, query.as_str())
            .await?;
        let list = self
            .suggestions
            .get(query.as_str())
            .unwrap_or(&self.default_suggestions)
            .clone();
        Ok(SuggestionsResponse(query.as_str().to_string(), list))
    }

    async fn stream(&self, instance: &Instance, stream_id: &str) -> FetchResult<Stream> {
        self.observe(instance, Operation::Stream, stream_id).await?;
        self.stream.clone().ok_or_else(|| FetchError::BadStatus {
            instance: instance.api_url.to_string(),
            status: 404,
        })
    }
}

/// Router that records every pushed target.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    targets: Mutex<Vec<String>>,
}

impl RecordingRouter {
    /// Targets pushed so far.
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        self.targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Router for RecordingRouter {
    fn push(&self, target: &str) {
        self.targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target.to_string());
    }
}

/// Highlight sink that records every highlighted video.
#[derive(Debug, Default)]
pub struct RecordingHighlight {
    videos: Mutex<Vec<TrendingVideo>>,
}

impl RecordingHighlight {
    /// Videos highlighted so far.
    #[must_use]
    pub fn highlighted(&self) -> Vec<TrendingVideo> {
        self.videos
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HighlightSink for RecordingHighlight {
    fn highlight(&self, video: &TrendingVideo) {
        self.videos
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(video.clone());
    }
}
