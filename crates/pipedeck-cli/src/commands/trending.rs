use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;
use pipedeck_core::{HighlightSink, TrendingLoader, TrendingVideo};

use crate::cli::TrendingArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_trending;

/// Keeps the most recently highlighted video.
#[derive(Debug, Default)]
pub(crate) struct LatestHighlight {
    video: Mutex<Option<TrendingVideo>>,
}

impl LatestHighlight {
    pub(crate) fn latest(&self) -> Option<TrendingVideo> {
        self.video
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HighlightSink for LatestHighlight {
    fn highlight(&self, video: &TrendingVideo) {
        *self.video.lock().unwrap_or_else(PoisonError::into_inner) = Some(video.clone());
    }
}

pub(crate) async fn handle_trending(ctx: &AppContext, args: TrendingArgs) -> CliResult<()> {
    let highlight = Arc::new(LatestHighlight::default());
    let loader = TrendingLoader::new(
        ctx.gateway.clone(),
        &ctx.instances,
        highlight.clone(),
        ctx.config.default_region.clone(),
    );
    loader.load().await;

    let state = loader.state();
    if state.unavailable {
        return Err(CliError::failure(anyhow!(
            "no instance could serve trending videos for region {}",
            state.region
        )));
    }
    render_trending(&state, highlight.latest().as_ref(), args.limit, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use pipedeck_config::ClientConfig;
    use pipedeck_core::Instance;
    use url::Url;

    fn fake_context() -> AppContext {
        let config = ClientConfig {
            fake_data: true,
            fake_delay_ms: 0,
            ..ClientConfig::default()
        };
        AppContext::from_config(config, OutputFormat::Json).expect("context")
    }

    #[tokio::test]
    async fn fixture_trending_renders() {
        handle_trending(&fake_context(), TrendingArgs { limit: Some(1) })
            .await
            .expect("trending should render");
    }

    #[tokio::test]
    async fn unreachable_mirrors_fail_with_exit_code_three() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/trending").query_param("region", "US");
            then.status(503);
        });
        let config = ClientConfig {
            instances: vec![Instance::new(
                "mock",
                Url::parse(&server.base_url()).expect("url"),
            )],
            ..ClientConfig::default()
        };
        let ctx = AppContext::from_config(config, OutputFormat::Table).expect("context");

        let err = handle_trending(&ctx, TrendingArgs { limit: None })
            .await
            .expect_err("trending should fail");
        assert_eq!(err.exit_code(), 3);
        mock.assert_calls(2);
    }

    #[test]
    fn highlight_keeps_latest_video() {
        let sink = LatestHighlight::default();
        sink.highlight(&TrendingVideo {
            title: "first".to_string(),
            ..TrendingVideo::default()
        });
        sink.highlight(&TrendingVideo {
            title: "second".to_string(),
            ..TrendingVideo::default()
        });
        assert_eq!(sink.latest().map(|video| video.title).as_deref(), Some("second"));
    }
}
