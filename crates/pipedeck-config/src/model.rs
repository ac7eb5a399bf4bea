//! Typed client configuration model.

use serde::{Deserialize, Serialize};

use pipedeck_models::Instance;

use crate::defaults::{
    DEFAULT_FAKE_DELAY_MS, DEFAULT_LOG_LEVEL, DEFAULT_REGION, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SUGGESTION_DEBOUNCE_MS, default_instances,
};

/// Client configuration consumed by the core services and the CLI.
///
/// Every field is optional in the JSON document; missing fields keep their
/// built-in default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Candidate mirrors in preference order.
    pub instances: Vec<Instance>,
    /// Region requested from `/trending`.
    pub default_region: String,
    /// Serve fixture data instead of contacting mirrors.
    pub fake_data: bool,
    /// Artificial latency of the fixture backend, in milliseconds.
    pub fake_delay_ms: u64,
    /// Suggestion debounce window, in milliseconds.
    pub suggestion_debounce_ms: u64,
    /// Attempt budget for one failover sequence; defaults to the mirror count.
    pub max_attempts: Option<usize>,
    /// Per-request HTTP timeout, in seconds.
    pub request_timeout_secs: u64,
    /// Log level handed to the tracing subscriber.
    pub log_level: String,
    /// Optional log format override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormatSetting>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            instances: default_instances(),
            default_region: DEFAULT_REGION.to_string(),
            fake_data: false,
            fake_delay_ms: DEFAULT_FAKE_DELAY_MS,
            suggestion_debounce_ms: DEFAULT_SUGGESTION_DEBOUNCE_MS,
            max_attempts: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: None,
        }
    }
}

impl ClientConfig {
    /// Attempt budget for one failover sequence.
    ///
    /// Falls back to the mirror count and never returns zero.
    #[must_use]
    pub fn attempt_budget(&self) -> usize {
        self.max_attempts
            .unwrap_or(self.instances.len())
            .max(1)
    }
}

/// Log output format selectable from configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormatSetting {
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"fake_data": true, "log_format": "json"}"#).expect("decode");
        assert!(config.fake_data);
        assert_eq!(config.log_format, Some(LogFormatSetting::Json));
        assert_eq!(config.default_region, DEFAULT_REGION);
        assert_eq!(config.instances, default_instances());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<ClientConfig>(r#"{"regoin": "BR"}"#).is_err());
    }

    #[test]
    fn attempt_budget_defaults_to_instance_count() {
        let mut config = ClientConfig::default();
        assert_eq!(config.attempt_budget(), config.instances.len());
        config.max_attempts = Some(0);
        assert_eq!(config.attempt_budget(), 1);
        config.max_attempts = None;
        config.instances.clear();
        assert_eq!(config.attempt_budget(), 1);
    }
}
