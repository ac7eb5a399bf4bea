//! Trending loader behavior against scripted backends.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use pipedeck_core::{FetchGateway, TrendingLoader};
use pipedeck_test_support::fixtures::{instance_list, trending_video};
use pipedeck_test_support::mocks::{Operation, RecordingHighlight, ScriptedBackend};
use tokio::time::sleep;

fn loader(
    backend: &Arc<ScriptedBackend>,
    names: &[&str],
) -> Result<(TrendingLoader, Arc<RecordingHighlight>)> {
    let highlight = Arc::new(RecordingHighlight::default());
    let loader = TrendingLoader::new(
        FetchGateway::new(backend.clone()),
        &instance_list(names)?,
        highlight.clone(),
        "US",
    );
    Ok((loader, highlight))
}

fn sample() -> Vec<pipedeck_core::TrendingVideo> {
    vec![
        trending_video("first", "First"),
        trending_video("second", "Second"),
    ]
}

#[tokio::test]
async fn failover_publishes_videos_and_serving_instance() -> Result<()> {
    let backend = Arc::new(
        ScriptedBackend::new()
            .fail_instance("x")
            .with_trending(sample()),
    );
    let (loader, highlight) = loader(&backend, &["x", "y"])?;

    loader.load().await;

    let state = loader.state();
    assert!(!state.loading);
    assert!(!state.unavailable);
    assert_eq!(state.videos, sample());
    assert_eq!(
        state.instance.map(|instance| instance.name),
        Some("y".to_string())
    );
    let highlighted: Vec<String> = highlight
        .highlighted()
        .into_iter()
        .map(|video| video.title)
        .collect();
    assert_eq!(highlighted, ["First"]);
    Ok(())
}

#[tokio::test]
async fn all_instances_failing_marks_unavailable() -> Result<()> {
    let backend = Arc::new(
        ScriptedBackend::new()
            .fail_instance("x")
            .fail_instance("y")
            .with_trending(sample()),
    );
    let (loader, highlight) = loader(&backend, &["x", "y"])?;

    loader.load().await;

    let state = loader.state();
    assert!(!state.loading);
    assert!(state.videos.is_empty());
    assert!(state.unavailable);
    assert!(highlight.highlighted().is_empty());
    assert_eq!(backend.calls_for(Operation::Trending).len(), 4);
    assert!(
        backend
            .calls()
            .iter()
            .all(|call| call.argument == "US")
    );

    loader.retry().await;
    assert!(loader.state().unavailable);
    assert_eq!(backend.calls_for(Operation::Trending).len(), 8);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn superseded_region_result_is_discarded() -> Result<()> {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_trending(sample())
            .delay_for("US", Duration::from_millis(200)),
    );
    let (loader, highlight) = loader(&backend, &["x"])?;

    let (_, changed) = tokio::join!(loader.load(), async {
        sleep(Duration::from_millis(10)).await;
        loader.set_region("BR").await
    });

    assert!(changed);
    let state = loader.state();
    assert_eq!(state.region, "BR");
    assert!(!state.loading);
    assert_eq!(state.videos.len(), 2);
    assert_eq!(highlight.highlighted().len(), 1);
    let regions: Vec<String> = backend
        .calls_for(Operation::Trending)
        .into_iter()
        .map(|call| call.argument)
        .collect();
    assert_eq!(regions, ["US", "BR"]);
    Ok(())
}

#[tokio::test]
async fn observers_see_loading_transition() -> Result<()> {
    let backend = Arc::new(ScriptedBackend::new().with_trending(sample()));
    let (loader, _) = loader(&backend, &["x"])?;
    let mut changes = loader.subscribe();
    assert!(!changes.borrow_and_update().loading);

    loader.load().await;

    assert!(changes.has_changed()?);
    let state = changes.borrow_and_update().clone();
    assert!(!state.loading);
    assert_eq!(state.videos.len(), 2);
    Ok(())
}
