//! Watch page: target parsing and stream metadata loading.

use std::sync::{Mutex, PoisonError};

use pipedeck_models::{Instance, Stream};
use tracing::{info, instrument};
use url::Url;

use crate::error::FetchResult;
use crate::gateway::FetchGateway;
use crate::registry::{InstanceList, RegistryState};

/// What a watch URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchTarget {
    /// A stream identified by the `v` parameter.
    Stream(String),
    /// No usable `v` parameter.
    NotFound,
}

impl WatchTarget {
    /// Target from decoded query pairs; the first `v` wins.
    #[must_use]
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .find(|(key, _)| key.as_ref() == "v")
            .map(|(_, value)| value.as_ref().trim().to_string())
            .filter(|id| !id.is_empty())
            .map_or(Self::NotFound, Self::Stream)
    }

    /// Target from a parsed watch URL.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query_pairs())
    }

    /// Stream identifier, if any.
    #[must_use]
    pub fn stream_id(&self) -> Option<&str> {
        match self {
            Self::Stream(id) => Some(id),
            Self::NotFound => None,
        }
    }
}

/// Loads stream metadata with failover, remembering the serving instance.
pub struct StreamLoader {
    gateway: FetchGateway,
    registry: Mutex<RegistryState>,
}

impl StreamLoader {
    /// Loader over `instances`.
    #[must_use]
    pub fn new(gateway: FetchGateway, instances: &InstanceList) -> Self {
        Self {
            gateway,
            registry: Mutex::new(RegistryState::seed(instances)),
        }
    }

    /// Fetch metadata for `stream_id`.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when every attempt fails.
    #[instrument(name = "stream.load", skip(self))]
    pub async fn load(&self, stream_id: &str) -> FetchResult<Stream> {
        let registry = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let (stream, serving) = self.gateway.stream(stream_id, registry).await?;
        if let Some(instance) = serving.current() {
            info!(instance = %instance.name, "stream metadata loaded");
        }
        *self.registry.lock().unwrap_or_else(PoisonError::into_inner) = serving;
        Ok(stream)
    }

    /// Instance the next load will start from.
    #[must_use]
    pub fn current_instance(&self) -> Option<Instance> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current()
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FixtureBackend;
    use std::sync::Arc;

    #[test]
    fn target_reads_v_parameter() {
        let url = Url::parse("https://app.test/watch?t=12&v=abc123").expect("url");
        assert_eq!(WatchTarget::from_url(&url), WatchTarget::Stream("abc123".into()));
        assert_eq!(WatchTarget::from_url(&url).stream_id(), Some("abc123"));

        let blank = Url::parse("https://app.test/watch?v=%20").expect("url");
        assert_eq!(WatchTarget::from_url(&blank), WatchTarget::NotFound);
        assert_eq!(
            WatchTarget::from_query([("list", "x")]),
            WatchTarget::NotFound
        );
    }

    #[tokio::test]
    async fn load_returns_fixture_stream() {
        let instances = InstanceList::new(vec![Instance::new(
            "offline",
            Url::parse("https://offline.test").expect("url"),
        )])
        .expect("list");
        let loader = StreamLoader::new(
            FetchGateway::new(Arc::new(FixtureBackend::default())),
            &instances,
        );
        let stream = loader.load("8PfSXr3nBHo").await.expect("stream");
        assert!(!stream.video_streams.is_empty());
        assert_eq!(
            loader.current_instance().map(|instance| instance.name),
            Some("offline".to_string())
        );
    }
}
