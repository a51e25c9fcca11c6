//! HTTP client abstraction and utilities

use crate::error;
use crate::stream_utils::Lines;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::pin::Pin;
use std::time::Duration;
use tracing::warn;
use unillm_core::Error;

use crate::constants::DEFAULT_TIMEOUT;

/// Type alias for a stream of response lines
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

/// HTTP client abstraction
///
/// A non-success status is an `Err` from both methods. Errors while reading
/// the body arrive as an `Err` item on the line stream.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a POST request and read the whole body
    async fn post(&self, url: &str, headers: HeaderMap, body: Value) -> Result<String, Error>;

    /// Send a POST request and yield the body line by line
    async fn post_lines(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Value,
    ) -> Result<LineStream, Error>;
}

/// Default HTTP client implementation using reqwest
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, Error> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client with a whole-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(error::network_error)?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Value,
    ) -> Result<reqwest::Response, Error> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(error::network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(%status, url, "Provider returned an error status");
            return Err(error::status_error(status, text));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn post(&self, url: &str, headers: HeaderMap, body: Value) -> Result<String, Error> {
        let response = self.send(url, headers, body).await?;
        response.text().await.map_err(error::network_error)
    }

    async fn post_lines(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Value,
    ) -> Result<LineStream, Error> {
        let response = self.send(url, headers, body).await?;
        let lines = Lines::new(response.bytes_stream())
            .map(|line| line.map_err(error::network_error));
        Ok(Box::pin(lines))
    }
}

/// Headers for a JSON request, plus bearer auth when a key is given
pub fn create_headers(api_key: Option<&str>) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(api_key) = api_key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| Error::Configuration(format!("Invalid API key: {}", e)))?,
        );
    }

    Ok(headers)
}

/// Build a header value from configuration data
pub fn header_value(name: &str, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Configuration(format!("Invalid value for header {}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_headers() {
        let headers = create_headers(Some("sk-test")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk-test");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");

        let headers = create_headers(None).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_key_is_configuration_error() {
        let result = create_headers(Some("bad\nkey"));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
