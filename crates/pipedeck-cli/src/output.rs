//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use pipedeck_core::{Instance, SearchRoute, Stream, TrendingState, TrendingVideo};
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json(value: &impl Serialize) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

fn instance_label(instance: Option<&Instance>) -> String {
    instance.map_or_else(
        || "<none>".to_string(),
        |instance| format!("{} ({})", instance.name, instance.api_url),
    )
}

pub(crate) fn render_trending(
    state: &TrendingState,
    highlight: Option<&TrendingVideo>,
    limit: Option<usize>,
    format: OutputFormat,
) -> CliResult<()> {
    let shown = limit.map_or(state.videos.len(), |limit| limit.min(state.videos.len()));
    let videos = &state.videos[..shown];
    match format {
        OutputFormat::Json => print_json(&json!({
            "region": state.region,
            "instance": state.instance,
            "highlight": highlight,
            "videos": videos,
        })),
        OutputFormat::Table => {
            println!("region: {}", state.region);
            println!("instance: {}", instance_label(state.instance.as_ref()));
            if let Some(video) = highlight {
                println!("highlight: {} ({})", video.title, video.uploader_name);
            }
            println!("{:<11} {:>8} {:>7} {:<24} TITLE", "ID", "LENGTH", "VIEWS", "CHANNEL");
            for video in videos {
                println!(
                    "{:<11} {:>8} {:>7} {:<24} {}",
                    video.video_id().unwrap_or("-"),
                    format_duration(video.duration),
                    format_count(video.views),
                    truncate(&video.uploader_name, 24),
                    video.title
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_suggestions(
    query: &str,
    suggestions: &[String],
    instance: Option<&Instance>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "query": query,
            "instance": instance,
            "suggestions": suggestions,
        })),
        OutputFormat::Table => {
            if suggestions.is_empty() {
                println!("no suggestions for '{query}'");
            }
            for suggestion in suggestions {
                println!("{suggestion}");
            }
            Ok(())
        }
    }
}

pub(crate) fn render_route(route: &SearchRoute, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({ "route": route.as_str() })),
        OutputFormat::Table => {
            println!("{route}");
            Ok(())
        }
    }
}

pub(crate) fn render_stream(
    id: &str,
    stream: &Stream,
    instance: Option<&Instance>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "id": id,
            "instance": instance,
            "stream": stream,
        })),
        OutputFormat::Table => {
            println!("id: {id}");
            println!("title: {}", stream.title);
            println!("uploader: {}", stream.uploader);
            println!("length: {}", format_duration(stream.duration));
            println!("views: {}", format_count(stream.views));
            if let Some(date) = &stream.upload_date {
                println!("uploaded: {date}");
            }
            println!("manifest: {}", stream.manifest_url().unwrap_or("<none>"));
            println!("instance: {}", instance_label(instance));
            if !stream.video_streams.is_empty() {
                println!("video streams:");
                for rendition in &stream.video_streams {
                    println!(
                        "  {:<8} {:<12} {}",
                        rendition.quality,
                        rendition.format,
                        if rendition.video_only { "video only" } else { "muxed" }
                    );
                }
            }
            if !stream.audio_streams.is_empty() {
                println!("audio streams:");
                for rendition in &stream.audio_streams {
                    println!("  {:<8} {:<12}", rendition.quality, rendition.format);
                }
            }
            Ok(())
        }
    }
}

/// `h:mm:ss` or `m:ss`; negative durations mark live streams.
pub(crate) fn format_duration(seconds: i64) -> String {
    if seconds < 0 {
        return "LIVE".to_string();
    }
    let (hours, minutes, secs) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Compact count with `K`, `M`, or `B` suffix.
pub(crate) fn format_count(count: i64) -> String {
    const UNITS: [(i64, &str); 3] = [(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];
    for (scale, suffix) in UNITS {
        if count >= scale {
            let whole = count / scale;
            let tenth = (count % scale) * 10 / scale;
            return if whole >= 100 || tenth == 0 {
                format!("{whole}{suffix}")
            } else {
                format!("{whole}.{tenth}{suffix}")
            };
        }
    }
    count.max(0).to_string()
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut shortened: String = value.chars().take(width.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}
