//! # Design
//!
//! - One error type for every fetch path so failover can classify uniformly.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Only transport, status, and payload failures trigger failover.

use thiserror::Error;

/// Result alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors raised while talking to backend instances.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport or connect failure for one instance.
    #[error("instance request failed")]
    Network {
        /// Base URL of the instance.
        instance: String,
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// Instance answered with a non-success status.
    #[error("instance returned an unsuccessful status")]
    BadStatus {
        /// Base URL of the instance.
        instance: String,
        /// HTTP status code.
        status: u16,
    },
    /// Instance payload did not decode into the expected shape.
    #[error("instance returned a malformed payload")]
    BadResponse {
        /// Base URL of the instance.
        instance: String,
        /// Decoder failure detail.
        reason: String,
    },
    /// Endpoint URL could not be derived from the instance base URL.
    #[error("invalid instance endpoint")]
    InvalidEndpoint {
        /// Base URL of the instance.
        instance: String,
        /// Source URL parse error.
        source: url::ParseError,
    },
    /// Result arrived after the intent it answers was superseded.
    #[error("result superseded by a newer request")]
    Stale {
        /// Intent the discarded result answered (query text or region).
        intent: String,
    },
    /// Registry has no candidate instances.
    #[error("no backend instances available")]
    NoInstances,
    /// Instance list contained the same base URL twice.
    #[error("duplicate backend instance")]
    DuplicateInstance {
        /// Duplicated base URL.
        api_url: String,
    },
    /// Building the HTTP client failed.
    #[error("failed to build http client")]
    Client {
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// Every candidate failed within the attempt budget.
    #[error("all backend instances unavailable")]
    AllInstancesUnavailable {
        /// Attempts spent before giving up.
        attempts: usize,
        /// Last underlying failure.
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether this failure should advance the registry and retry.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::BadStatus { .. }
                | Self::BadResponse { .. }
                | Self::InvalidEndpoint { .. }
        )
    }

    /// Base URL of the instance this failure is attributed to, if any.
    #[must_use]
    pub fn instance(&self) -> Option<&str> {
        match self {
            Self::Network { instance, .. }
            | Self::BadStatus { instance, .. }
            | Self::BadResponse { instance, .. }
            | Self::InvalidEndpoint { instance, .. } => Some(instance),
            Self::AllInstancesUnavailable { last, .. } => last.instance(),
            Self::Stale { .. }
            | Self::NoInstances
            | Self::DuplicateInstance { .. }
            | Self::Client { .. } => None,
        }
    }
}
