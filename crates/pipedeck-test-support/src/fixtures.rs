//! Instance lists and sample records.

use anyhow::Result;
use pipedeck_core::InstanceList;
use pipedeck_models::{Instance, Stream, TrendingVideo};
use url::Url;

/// Instance named `name` served from `https://{name}.mirror.test`.
///
/// # Errors
///
/// Returns an error when `name` does not form a valid host.
pub fn instance(name: &str) -> Result<Instance> {
    Ok(Instance::new(
        name,
        Url::parse(&format!("https://{name}.mirror.test"))?,
    ))
}

/// Instance list built from `names`, in order.
///
/// # Errors
///
/// Returns an error for invalid or duplicate names.
pub fn instance_list(names: &[&str]) -> Result<InstanceList> {
    let instances = names
        .iter()
        .copied()
        .map(instance)
        .collect::<Result<Vec<_>>>()?;
    Ok(InstanceList::new(instances)?)
}

/// Trending record for video `id`.
#[must_use]
pub fn trending_video(id: &str, title: &str) -> TrendingVideo {
    TrendingVideo {
        url: format!("/watch?v={id}"),
        kind: Some("stream".to_string()),
        title: title.to_string(),
        uploader_name: "Fixture Channel".to_string(),
        duration: 60,
        ..TrendingVideo::default()
    }
}

/// Stream record titled `title` with an HLS manifest.
#[must_use]
pub fn stream(title: &str) -> Stream {
    Stream {
        title: title.to_string(),
        hls: Some("https://cdn.mirror.test/master.m3u8".to_string()),
        ..Stream::default()
    }
}
