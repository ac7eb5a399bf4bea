//! Telemetry error type.

use thiserror::Error;

/// Result alias for telemetry setup.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Failures while wiring up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed or could not be set.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Error reported by `tracing-subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use tracing_subscriber::util::SubscriberInitExt;

    #[test]
    fn second_install_reports_subscriber_error() {
        // The first install may succeed or lose to another test; the second
        // always conflicts.
        let _ = tracing_subscriber::registry().try_init();
        let source = tracing_subscriber::registry()
            .try_init()
            .expect_err("global subscriber already set");

        let err = TelemetryError::SubscriberInstall { source };
        assert_eq!(err.to_string(), "failed to install tracing subscriber");
        assert!(err.source().is_some());
    }
}
