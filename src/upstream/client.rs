//! HTTP client backed fetcher.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::Request;
use axum::response::Response;

use crate::config::TimeoutConfig;
use crate::upstream::{FetchError, Fetcher};

/// Fetcher that performs real network requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a client with the configured connect and upstream timeouts.
    pub fn new(config: &TimeoutConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(config.upstream_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_secs))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if err.is_connect() {
            FetchError::Connect(err.to_string())
        } else if err.is_builder() {
            FetchError::InvalidRequest(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: Request<Bytes>) -> Result<Response, FetchError> {
        let request = reqwest::Request::try_from(request).map_err(|e| self.classify(e))?;
        let response = self.client.execute(request).await.map_err(|e| self.classify(e))?;

        let response: axum::http::Response<reqwest::Body> = response.into();
        Ok(response.map(Body::new))
    }
}
