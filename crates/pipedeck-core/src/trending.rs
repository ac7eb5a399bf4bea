//! Trending list loader with region tracking.
//!
//! # Design
//! - Each load takes a generation number; results from an older generation
//!   are dropped so a region change always wins.
//! - Failures never escape: after one extra advance-and-retry cycle the state
//!   settles on `unavailable` and [`TrendingLoader::retry`] reloads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use pipedeck_models::{Instance, TrendingVideo};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{FetchError, FetchResult};
use crate::gateway::FetchGateway;
use crate::registry::{InstanceList, RegistryState};

/// Receives the video promoted to the page header.
pub trait HighlightSink: Send + Sync {
    /// Show `video` as the highlighted item.
    fn highlight(&self, video: &TrendingVideo);
}

/// Observable state of the trending list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendingState {
    /// Region of the most recent load.
    pub region: String,
    /// A load is in progress.
    pub loading: bool,
    /// Videos from the last successful load.
    pub videos: Vec<TrendingVideo>,
    /// Instance serving (or being asked for) the list.
    pub instance: Option<Instance>,
    /// Every instance failed; a retry affordance should be shown.
    pub unavailable: bool,
}

/// Loads trending videos for the selected region with failover.
pub struct TrendingLoader {
    gateway: FetchGateway,
    highlight: Arc<dyn HighlightSink>,
    store: watch::Sender<TrendingState>,
    registry: Mutex<RegistryState>,
    generation: AtomicU64,
}

impl TrendingLoader {
    /// Loader for `region` over `instances`. Nothing is fetched until
    /// [`TrendingLoader::load`] runs.
    #[must_use]
    pub fn new(
        gateway: FetchGateway,
        instances: &InstanceList,
        highlight: Arc<dyn HighlightSink>,
        region: impl Into<String>,
    ) -> Self {
        let (store, _) = watch::channel(TrendingState {
            region: region.into(),
            ..TrendingState::default()
        });
        Self {
            gateway,
            highlight,
            store,
            registry: Mutex::new(RegistryState::seed(instances)),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> TrendingState {
        self.store.borrow().clone()
    }

    /// Receiver notified after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TrendingState> {
        self.store.subscribe()
    }

    /// Fetch the list for the current region.
    pub async fn load(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let registry = self.registry_snapshot();
        let mut region = String::new();
        self.store.send_modify(|state| {
            state.loading = true;
            state.unavailable = false;
            state.instance = registry.current().cloned();
            region.clone_from(&state.region);
        });

        let outcome = match self.gateway.trending(&region, registry.clone()).await {
            Ok(found) => Ok(found),
            Err(err) => {
                warn!(region = %region, error = %err, "trending failed, retrying once");
                self.gateway.trending(&region, registry.advance()).await
            }
        };

        if let Err(err) = self.publish(generation, &region, outcome) {
            debug!(error = %err, region = %region, "discarding trending result");
        }
    }

    /// Switch to `region` and reload. Returns `false` without fetching when
    /// the region is unchanged.
    pub async fn set_region(&self, region: &str) -> bool {
        let changed = self.store.send_if_modified(|state| {
            if state.region == region {
                return false;
            }
            region.clone_into(&mut state.region);
            true
        });
        if changed {
            info!(region, "trending region changed");
            self.load().await;
        }
        changed
    }

    /// Reload the current region, typically after `unavailable` was shown.
    pub async fn retry(&self) {
        self.load().await;
    }

    /// Instance the next load will start from.
    #[must_use]
    pub fn current_instance(&self) -> Option<Instance> {
        self.registry_snapshot().current().cloned()
    }

    fn registry_snapshot(&self) -> RegistryState {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(
        &self,
        generation: u64,
        region: &str,
        outcome: FetchResult<(Vec<TrendingVideo>, RegistryState)>,
    ) -> FetchResult<()> {
        let mut current = true;
        let mut highlighted = None;
        let mut serving = None;
        self.store.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                current = false;
                return false;
            }
            state.loading = false;
            match outcome {
                Ok((videos, registry)) => {
                    state.instance = registry.current().cloned();
                    highlighted = videos.first().cloned();
                    state.videos = videos;
                    state.unavailable = false;
                    serving = Some(registry);
                }
                Err(err) => {
                    warn!(region, error = %err, "trending unavailable");
                    state.videos.clear();
                    state.unavailable = true;
                }
            }
            true
        });

        if !current {
            return Err(FetchError::Stale {
                intent: region.to_string(),
            });
        }
        if let Some(registry) = serving {
            *self.registry.lock().unwrap_or_else(PoisonError::into_inner) = registry;
        }
        if let Some(video) = highlighted {
            self.highlight.highlight(&video);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FixtureBackend;
    use url::Url;

    #[derive(Default)]
    struct Highlights(Mutex<Vec<String>>);

    impl HighlightSink for Highlights {
        fn highlight(&self, video: &TrendingVideo) {
            self.0.lock().expect("highlights").push(video.title.clone());
        }
    }

    fn loader(highlights: Arc<Highlights>) -> TrendingLoader {
        let instances = InstanceList::new(vec![Instance::new(
            "offline",
            Url::parse("https://offline.test").expect("url"),
        )])
        .expect("list");
        TrendingLoader::new(
            FetchGateway::new(Arc::new(FixtureBackend::default())),
            &instances,
            highlights,
            "US",
        )
    }

    #[tokio::test]
    async fn load_publishes_videos_and_highlight() {
        let highlights = Arc::new(Highlights::default());
        let loader = loader(Arc::clone(&highlights));
        loader.load().await;

        let state = loader.state();
        assert!(!state.loading);
        assert!(!state.unavailable);
        assert_eq!(state.videos.len(), 3);
        assert_eq!(
            state.instance.map(|instance| instance.name),
            Some("offline".to_string())
        );
        assert_eq!(
            *highlights.0.lock().expect("highlights"),
            [state.videos[0].title.clone()]
        );
    }

    #[tokio::test]
    async fn unchanged_region_does_not_reload() {
        let highlights = Arc::new(Highlights::default());
        let loader = loader(Arc::clone(&highlights));
        assert!(!loader.set_region("US").await);
        assert!(highlights.0.lock().expect("highlights").is_empty());

        assert!(loader.set_region("DE").await);
        assert_eq!(loader.state().region, "DE");
        assert_eq!(highlights.0.lock().expect("highlights").len(), 1);
    }
}
