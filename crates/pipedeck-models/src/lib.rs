#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared wire DTOs for the Pipedeck backend instances.
//!
//! These types mirror the JSON documents served by every mirror so that the
//! HTTP backend, the fixture backend, and the CLI renderers decode and encode
//! the same shapes. Unknown fields are ignored and most scalar fields default,
//! since mirrors run different backend revisions.
use serde::{Deserialize, Serialize};
use url::Url;

/// One backend mirror exposing the trending/suggestions/stream API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Instance {
    /// Human-readable mirror name.
    pub name: String,
    /// Base URL that API paths are appended to.
    pub api_url: Url,
}

impl Instance {
    /// Construct an instance from a name and parsed base URL.
    #[must_use]
    pub fn new(name: impl Into<String>, api_url: Url) -> Self {
        Self {
            name: name.into(),
            api_url,
        }
    }

    /// Join an API path onto the base URL, keeping any base path segment.
    ///
    /// `Url::join` drops the last path segment of a base without a trailing
    /// slash, so the path is appended textually instead.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the combined string is not a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.api_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
    }
}

/// Video summary record returned by `/trending` and embedded in streams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrendingVideo {
    /// Relative watch URL, e.g. `/watch?v=dQw4w9WgXcQ`.
    pub url: String,
    /// Item kind reported by the mirror (`stream`, `channel`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Video title.
    #[serde(default)]
    pub title: String,
    /// Thumbnail image URL.
    #[serde(default)]
    pub thumbnail: String,
    /// Channel display name.
    #[serde(default)]
    pub uploader_name: String,
    /// Relative channel URL.
    #[serde(default)]
    pub uploader_url: String,
    /// Channel avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_avatar: Option<String>,
    /// Human-readable upload age ("2 days ago").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_date: Option<String>,
    /// Truncated description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    /// Duration in seconds; negative for live streams.
    #[serde(default)]
    pub duration: i64,
    /// View count.
    #[serde(default)]
    pub views: i64,
    /// Upload timestamp in milliseconds since the epoch.
    #[serde(default)]
    pub uploaded: i64,
    /// Whether the channel is verified.
    #[serde(default)]
    pub uploader_verified: bool,
    /// Whether the item is a short-form video.
    #[serde(default)]
    pub is_short: bool,
}

impl TrendingVideo {
    /// Extract the video identifier from the `v` parameter of the watch URL.
    #[must_use]
    pub fn video_id(&self) -> Option<&str> {
        let (_, query) = self.url.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "v")
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }
}

/// Suggestion payload shaped as `[echoedQuery, [suggestion, ...]]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SuggestionsResponse(pub String, pub Vec<String>);

impl SuggestionsResponse {
    /// Query echoed back by the mirror.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.0
    }

    /// Suggestion list (index 1 of the payload).
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.1
    }

    /// Consume the payload and return the suggestion list.
    #[must_use]
    pub fn into_suggestions(self) -> Vec<String> {
        self.1
    }
}

/// One playable rendition of a stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaStream {
    /// Direct media URL.
    pub url: String,
    /// Container format label.
    #[serde(default)]
    pub format: String,
    /// Quality label (`1080p`, `128 kbps`).
    #[serde(default)]
    pub quality: String,
    /// MIME type reported by the mirror.
    #[serde(default)]
    pub mime_type: String,
    /// Codec string, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// Whether the rendition carries no audio track.
    #[serde(default)]
    pub video_only: bool,
    /// Bitrate in bits per second.
    #[serde(default)]
    pub bitrate: u64,
    /// Frame width in pixels (video only).
    #[serde(default)]
    pub width: u32,
    /// Frame height in pixels (video only).
    #[serde(default)]
    pub height: u32,
    /// Frames per second (video only).
    #[serde(default)]
    pub fps: u32,
}

/// Stream metadata record returned by `/streams/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    /// Video title.
    pub title: String,
    /// Full description (HTML).
    #[serde(default)]
    pub description: String,
    /// Upload date as reported by the mirror.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    /// Channel display name.
    #[serde(default)]
    pub uploader: String,
    /// Relative channel URL.
    #[serde(default)]
    pub uploader_url: String,
    /// Channel avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_avatar: Option<String>,
    /// Poster image URL.
    #[serde(default)]
    pub thumbnail_url: String,
    /// HLS manifest URL, when offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls: Option<String>,
    /// DASH manifest URL, when offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: i64,
    /// View count.
    #[serde(default)]
    pub views: i64,
    /// Like count.
    #[serde(default)]
    pub likes: i64,
    /// Dislike count (`-1` when hidden).
    #[serde(default)]
    pub dislikes: i64,
    /// Channel subscriber count.
    #[serde(default)]
    pub uploader_subscriber_count: i64,
    /// Video renditions.
    #[serde(default)]
    pub video_streams: Vec<MediaStream>,
    /// Audio renditions.
    #[serde(default)]
    pub audio_streams: Vec<MediaStream>,
    /// Related items shown next to the player.
    #[serde(default)]
    pub related_streams: Vec<TrendingVideo>,
}

impl Stream {
    /// Preferred manifest for a player handoff: DASH first, then HLS.
    #[must_use]
    pub fn manifest_url(&self) -> Option<&str> {
        self.dash
            .as_deref()
            .or(self.hls.as_deref())
            .filter(|url| !url.is_empty())
    }
}
