//! Validation and normalization helpers for client configuration.

use std::collections::HashSet;

use crate::defaults::MAX_SUGGESTION_DEBOUNCE_MS;
use crate::error::{ConfigError, ConfigResult};
use crate::model::ClientConfig;

/// Validate a loaded configuration and return its normalized form.
///
/// Regions are upper-cased; everything else is checked as-is.
///
/// # Errors
///
/// Returns [`ConfigError::EmptyInstanceList`] when no mirrors are configured
/// and [`ConfigError::InvalidField`] for the first field that fails validation.
pub fn validate_config(mut config: ClientConfig) -> ConfigResult<ClientConfig> {
    validate_instances(&config)?;
    config.default_region = normalize_region(&config.default_region)?;

    if config.suggestion_debounce_ms > MAX_SUGGESTION_DEBOUNCE_MS {
        return Err(ConfigError::invalid(
            "suggestion_debounce_ms",
            config.suggestion_debounce_ms.to_string(),
            "must not exceed 5000",
        ));
    }
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "request_timeout_secs",
            "0",
            "must be positive",
        ));
    }
    if config.log_level.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            field: "log_level",
            value: None,
            reason: "must not be empty",
        });
    }
    Ok(config)
}

/// Normalize a region code to two upper-case ASCII letters.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not two letters.
pub fn normalize_region(value: &str) -> ConfigResult<String> {
    let trimmed = value.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(ConfigError::invalid(
            "default_region",
            value,
            "must be a two-letter region code",
        ))
    }
}

fn validate_instances(config: &ClientConfig) -> ConfigResult<()> {
    if config.instances.is_empty() {
        return Err(ConfigError::EmptyInstanceList);
    }

    let mut seen = HashSet::new();
    for instance in &config.instances {
        if instance.name.trim().is_empty() {
            return Err(ConfigError::invalid(
                "instances",
                instance.api_url.as_str(),
                "instance name must not be empty",
            ));
        }
        if !matches!(instance.api_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "instances",
                instance.api_url.as_str(),
                "api_url must use http or https",
            ));
        }
        if !seen.insert(instance.api_url.as_str().trim_end_matches('/')) {
            return Err(ConfigError::invalid(
                "instances",
                instance.api_url.as_str(),
                "duplicate api_url",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipedeck_models::Instance;
    use url::Url;

    fn instance(name: &str, url: &str) -> Instance {
        Instance::new(name, Url::parse(url).expect("url"))
    }

    #[test]
    fn region_is_upper_cased() {
        assert_eq!(normalize_region(" br ").expect("region"), "BR");
        assert!(normalize_region("USA").is_err());
        assert!(normalize_region("u1").is_err());
    }

    #[test]
    fn defaults_are_valid() {
        let config = validate_config(ClientConfig::default()).expect("valid");
        assert_eq!(config.default_region, "US");
    }

    #[test]
    fn rejects_empty_and_duplicate_instances() {
        let mut config = ClientConfig {
            instances: Vec::new(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            validate_config(config.clone()),
            Err(ConfigError::EmptyInstanceList)
        ));

        config.instances = vec![
            instance("a", "https://api.example.org"),
            instance("b", "https://api.example.org/"),
        ];
        assert!(matches!(
            validate_config(config.clone()),
            Err(ConfigError::InvalidField {
                field: "instances",
                reason: "duplicate api_url",
                ..
            })
        ));

        config.instances = vec![instance("ftp", "ftp://api.example.org")];
        assert!(matches!(
            validate_config(config),
            Err(ConfigError::InvalidField {
                reason: "api_url must use http or https",
                ..
            })
        ));
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        let config = ClientConfig {
            suggestion_debounce_ms: MAX_SUGGESTION_DEBOUNCE_MS + 1,
            ..ClientConfig::default()
        };
        assert!(matches!(
            validate_config(config),
            Err(ConfigError::InvalidField {
                field: "suggestion_debounce_ms",
                ..
            })
        ));

        let config = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(validate_config(config).is_err());
    }
}
