//! Layered configuration loading.
//!
//! # Design
//! - Sources apply in order: built-in defaults, JSON file, environment.
//! - Environment lookups go through a closure so tests never touch the
//!   process environment.
//! - Validation runs once, after every layer has been applied.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::ClientConfig;
use crate::validate::validate_config;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "PIPEDECK_";

const FAKE_DATA: &str = "FAKE_DATA";
const FAKE_DELAY_MS: &str = "FAKE_DELAY_MS";
const REGION: &str = "REGION";
const MAX_ATTEMPTS: &str = "MAX_ATTEMPTS";
const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

/// Load configuration from defaults, an optional JSON file, and the process
/// environment.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, an environment
/// override is malformed, or the merged configuration fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<ClientConfig> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => ClientConfig::default(),
    };
    apply_env(&mut config, |name| std::env::var(name).ok())?;
    validate_config(config)
}

/// Load and validate a JSON configuration file without environment overrides.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed or fails validation.
pub fn load_from_path(path: &Path) -> ConfigResult<ClientConfig> {
    validate_config(read_file(path)?)
}

/// Apply `PIPEDECK_*` overrides resolved through `lookup`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when an override cannot be parsed.
pub fn apply_env<F>(config: &mut ClientConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(&format!("{ENV_PREFIX}{key}"));
    if let Some(raw) = var(FAKE_DATA) {
        config.fake_data = parse_flag(&raw)
            .ok_or_else(|| ConfigError::invalid("fake_data", raw.clone(), "must be a boolean flag"))?;
    }
    if let Some(raw) = var(FAKE_DELAY_MS) {
        config.fake_delay_ms = parse_number(&raw, "fake_delay_ms")?;
    }
    if let Some(raw) = var(REGION) {
        config.default_region = raw;
    }
    if let Some(raw) = var(MAX_ATTEMPTS) {
        config.max_attempts = Some(parse_number(&raw, "max_attempts")?);
    }
    if let Some(raw) = var(HTTP_TIMEOUT_SECS) {
        config.request_timeout_secs = parse_number(&raw, "request_timeout_secs")?;
    }
    Ok(())
}

fn read_file(path: &Path) -> ConfigResult<ClientConfig> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded configuration file");
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &'static str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, value, "must be a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = ClientConfig::default();
        apply_env(
            &mut config,
            lookup_from(&[
                ("PIPEDECK_FAKE_DATA", "yes"),
                ("PIPEDECK_FAKE_DELAY_MS", "25"),
                ("PIPEDECK_REGION", "br"),
                ("PIPEDECK_MAX_ATTEMPTS", "7"),
                ("PIPEDECK_HTTP_TIMEOUT_SECS", "3"),
            ]),
        )
        .expect("apply");
        assert!(config.fake_data);
        assert_eq!(config.fake_delay_ms, 25);
        assert_eq!(config.max_attempts, Some(7));
        assert_eq!(config.request_timeout_secs, 3);

        let config = validate_config(config).expect("valid");
        assert_eq!(config.default_region, "BR");
    }

    #[test]
    fn malformed_env_values_are_rejected() {
        let mut config = ClientConfig::default();
        let err = apply_env(&mut config, lookup_from(&[("PIPEDECK_FAKE_DATA", "maybe")]))
            .expect_err("flag should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "fake_data",
                ..
            }
        ));

        let err = apply_env(&mut config, lookup_from(&[("PIPEDECK_MAX_ATTEMPTS", "-1")]))
            .expect_err("number should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "max_attempts",
                ..
            }
        ));
    }

    #[test]
    fn only_prefixed_names_are_read() {
        let mut config = ClientConfig::default();
        let region = format!("{ENV_PREFIX}REGION");
        apply_env(
            &mut config,
            lookup_from(&[("REGION", "de"), ("FAKE_DATA", "maybe"), (region.as_str(), "jp")]),
        )
        .expect("apply");
        assert_eq!(config.default_region, "jp");
        assert!(!config.fake_data);
    }

    #[test]
    fn flag_parsing_matches_common_spellings() {
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("2"), None);
    }
}
