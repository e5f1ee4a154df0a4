use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;
use std::time::Duration;

use crate::domain::DomainError;

/// Stream type for HTTP responses
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Trait for HTTP client operations (for mocking)
///
/// Connection-level failures (refused, unreachable, timed out) are reported
/// as [`DomainError::BackendUnavailable`]; HTTP status and decode failures as
/// [`DomainError::Provider`].
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError>;

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<ByteStream, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Client that gives up when the backend goes silent for `read_timeout`.
    ///
    /// There is no overall deadline, so long generations and model pulls run
    /// for as long as bytes keep arriving.
    pub fn with_read_timeout(read_timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .read_timeout(read_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        headers: Vec<(&str, &str)>,
    ) -> Result<reqwest::Response, DomainError> {
        let mut request = request;
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn transport_error(e: reqwest::Error) -> DomainError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        DomainError::backend_unavailable("http", format!("Request failed: {}", e))
    } else {
        DomainError::provider("http", format!("Request failed: {}", e))
    }
}

async fn json_body(response: reqwest::Response) -> Result<serde_json::Value, DomainError> {
    response
        .json()
        .await
        .map_err(|e| DomainError::provider("http", format!("Invalid JSON from backend: {}", e)))
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError> {
        let response = self.send(self.client.get(url), headers).await?;
        json_body(response).await
    }

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let response = self.send(self.client.post(url).json(body), headers).await?;
        json_body(response).await
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<ByteStream, DomainError> {
        let response = self.send(self.client.post(url).json(body), headers).await?;

        let stream = response
            .bytes_stream()
            .map_err(|e| DomainError::backend_unavailable("http", format!("Stream interrupted: {}", e)));

        Ok(Box::pin(stream))
    }
}
