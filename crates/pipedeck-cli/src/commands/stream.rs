use anyhow::Context;
use pipedeck_core::{StreamLoader, WatchTarget};
use url::Url;
use url::form_urlencoded;

use crate::cli::StreamArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_stream;

/// Interpret a full watch URL, a `/watch?v=` path, or a bare id.
pub(crate) fn parse_target(raw: &str) -> WatchTarget {
    let raw = raw.trim();
    if let Ok(url) = Url::parse(raw) {
        return WatchTarget::from_url(&url);
    }
    if let Some((_, query)) = raw.split_once('?') {
        return WatchTarget::from_query(form_urlencoded::parse(query.as_bytes()));
    }
    WatchTarget::from_query([("v", raw)])
}

pub(crate) async fn handle_stream(ctx: &AppContext, args: StreamArgs) -> CliResult<()> {
    let target = parse_target(&args.target);
    let id = target
        .stream_id()
        .ok_or_else(|| CliError::validation("no video id found in target"))?;

    let loader = StreamLoader::new(ctx.gateway.clone(), &ctx.instances);
    let stream = loader
        .load(id)
        .await
        .with_context(|| format!("failed to load stream {id}"))
        .map_err(CliError::failure)?;
    render_stream(id, &stream, loader.current_instance().as_ref(), ctx.output)
}
