//! Built-in defaults for the client configuration.
//!
//! # Design
//! - Centralize defaults so the model, loader, and CLI agree on them.
//! - Keep the default mirror list ordered by preference.

use pipedeck_models::Instance;
use url::Url;

/// Region requested from `/trending` when none is configured.
pub const DEFAULT_REGION: &str = "US";
/// Artificial latency applied by the fixture backend, in milliseconds.
pub const DEFAULT_FAKE_DELAY_MS: u64 = 500;
/// Quiet period before a suggestion query is issued, in milliseconds.
pub const DEFAULT_SUGGESTION_DEBOUNCE_MS: u64 = 200;
/// Upper bound accepted for the suggestion debounce window.
pub const MAX_SUGGESTION_DEBOUNCE_MS: u64 = 5_000;
/// Per-request HTTP timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Log level used when neither the file nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DEFAULT_INSTANCES: &[(&str, &str)] = &[
    ("kavin.rocks", "https://pipedapi.kavin.rocks"),
    ("adminforge.de", "https://pipedapi.adminforge.de"),
    ("private.coffee", "https://api.piped.private.coffee"),
];

/// Default mirror list, in preference order.
#[must_use]
pub fn default_instances() -> Vec<Instance> {
    DEFAULT_INSTANCES
        .iter()
        .filter_map(|(name, url)| Url::parse(url).ok().map(|url| Instance::new(*name, url)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_instances_parse() {
        let instances = default_instances();
        assert_eq!(instances.len(), DEFAULT_INSTANCES.len());
        assert_eq!(instances[0].name, "kavin.rocks");
    }
}
