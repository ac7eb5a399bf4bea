//! HTTP backend built on `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use pipedeck_models::{Instance, Stream, SuggestionsResponse, TrendingVideo};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::Backend;
use crate::error::{FetchError, FetchResult};
use crate::query::Query;

/// Backend that issues real requests to mirror instances.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
}

impl HttpBackend {
    /// Wrap an existing client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when the client cannot be constructed.
    pub fn with_timeout(timeout: Duration) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pipedeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| FetchError::Client { source })?;
        Ok(Self { client })
    }

    async fn get_json<T: DeserializeOwned>(&self, instance: &Instance, url: Url) -> FetchResult<T> {
        debug!(url = %url, "requesting instance");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| network(instance, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                instance: instance.api_url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| network(instance, source))?;
        serde_json::from_slice(&bytes).map_err(|err| FetchError::BadResponse {
            instance: instance.api_url.to_string(),
            reason: err.to_string(),
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn trending(&self, instance: &Instance, region: &str) -> FetchResult<Vec<TrendingVideo>> {
        let mut url = endpoint(instance, "trending")?;
        url.query_pairs_mut().append_pair("region", region);
        self.get_json(instance, url).await
    }

    async fn suggestions(
        &self,
        instance: &Instance,
        query: &Query,
    ) -> FetchResult<SuggestionsResponse> {
        let mut url = endpoint(instance, "suggestions")?;
        url.set_query(Some(&format!("query={}", query.joined())));
        self.get_json(instance, url).await
    }

    async fn stream(&self, instance: &Instance, stream_id: &str) -> FetchResult<Stream> {
        let url = endpoint(
            instance,
            &format!("streams/{}", urlencoding::encode(stream_id)),
        )?;
        self.get_json(instance, url).await
    }
}

fn endpoint(instance: &Instance, path: &str) -> FetchResult<Url> {
    instance
        .endpoint(path)
        .map_err(|source| FetchError::InvalidEndpoint {
            instance: instance.api_url.to_string(),
            source,
        })
}

fn network(instance: &Instance, source: reqwest::Error) -> FetchError {
    FetchError::Network {
        instance: instance.api_url.to_string(),
        source,
    }
}
