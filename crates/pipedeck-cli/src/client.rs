//! Shared context, configuration wiring, and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use pipedeck_config::{ClientConfig, ConfigError, LogFormatSetting, normalize_region};
use pipedeck_core::{FetchGateway, InstanceList, Router, SuggestionSession};
use pipedeck_telemetry::{LogFormat, LoggingConfig, init_logging};
use tracing::{debug, info};

use crate::cli::{Cli, OutputFormat};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { path, source } => Self::failure(anyhow!(
                "failed to read configuration file '{}': {source}",
                path.display()
            )),
            ConfigError::Parse { path, source } => Self::validation(format!(
                "invalid configuration file '{}': {source}",
                path.display()
            )),
            ConfigError::InvalidField {
                field,
                value: Some(value),
                reason,
            } => Self::validation(format!("invalid {field} '{value}': {reason}")),
            ConfigError::InvalidField {
                field,
                value: None,
                reason,
            } => Self::validation(format!("invalid {field}: {reason}")),
            ConfigError::EmptyInstanceList => {
                Self::validation("configuration lists no backend instances")
            }
        }
    }
}

/// Router that records navigation requests in the log.
#[derive(Debug, Default)]
pub(crate) struct LogRouter;

impl Router for LogRouter {
    fn push(&self, target: &str) {
        info!(route = target, "navigation requested");
    }
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) config: ClientConfig,
    pub(crate) instances: InstanceList,
    pub(crate) gateway: FetchGateway,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Resolve configuration, install logging, and build the gateway.
    pub(crate) fn from_cli(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let config = pipedeck_config::load(cli.config.as_deref())?;
        let config = apply_overrides(config, cli.fake, cli.region.as_deref())?;
        init_telemetry(&config)?;
        debug!(
            trace_id,
            instances = config.instances.len(),
            fake = config.fake_data,
            "configuration resolved"
        );
        Self::from_config(config, cli.output)
    }

    /// Build the context from an already resolved configuration.
    pub(crate) fn from_config(config: ClientConfig, output: OutputFormat) -> CliResult<Self> {
        let instances = InstanceList::new(config.instances.clone())
            .map_err(|err| CliError::validation(format!("invalid instance list: {err}")))?;
        let gateway = FetchGateway::from_config(&config).map_err(CliError::failure)?;
        Ok(Self {
            config,
            instances,
            gateway,
            output,
        })
    }

    /// Search session wired to the configured debounce and a logging router.
    pub(crate) fn session(&self) -> SuggestionSession {
        SuggestionSession::new(
            self.gateway.clone(),
            &self.instances,
            Arc::new(LogRouter),
            Duration::from_millis(self.config.suggestion_debounce_ms),
        )
    }
}

/// Layer command-line flags over the loaded configuration.
pub(crate) fn apply_overrides(
    mut config: ClientConfig,
    fake: bool,
    region: Option<&str>,
) -> CliResult<ClientConfig> {
    if fake {
        config.fake_data = true;
    }
    if let Some(region) = region {
        config.default_region = normalize_region(region)?;
    }
    Ok(config)
}

fn init_telemetry(config: &ClientConfig) -> CliResult<()> {
    let format = match config.log_format {
        Some(LogFormatSetting::Json) => LogFormat::Json,
        Some(LogFormatSetting::Pretty) => LogFormat::Pretty,
        None => LogFormat::infer(),
    };
    init_logging(&LoggingConfig {
        level: &config.log_level,
        format,
        build_sha: option_env!("PIPEDECK_BUILD_SHA").unwrap_or("dev"),
    })
    .map_err(|err| CliError::failure(anyhow!("failed to initialise logging: {err}")))
}
