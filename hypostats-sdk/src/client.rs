//! HTTP client implementation
//!
//! JSON in, JSON out, with retries on transport failures, rate limiting and
//! 5xx responses.

use crate::config::{AuthConfig, SdkConfig};
use crate::error::{SdkError, SdkResult};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The HTTP client for making API requests
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<SdkConfig>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        for (name, value) in &config.custom_headers {
            let name = header::HeaderName::try_from(name.as_str()).map_err(|e| {
                SdkError::ConfigurationError(format!("invalid header name '{}': {}", name, e))
            })?;
            let value = header::HeaderValue::try_from(value.as_str()).map_err(|e| {
                SdkError::ConfigurationError(format!("invalid value for header '{}': {}", name, e))
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(SdkError::NetworkError)?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Build the full URL for an endpoint
    pub fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: B,
    ) -> SdkResult<T> {
        self.request(Method::POST, path, &body).await
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> SdkResult<T> {
        let body_json = serde_json::to_string(body)?;
        let response = self.execute_with_retry(method, path, body_json).await?;

        let status = response.status();
        let retry_after = retry_after(&response);
        let text = response.text().await.map_err(SdkError::NetworkError)?;

        debug!(status = status.as_u16(), body = %text, "Received response");

        if status.is_success() {
            serde_json::from_str(&text).map_err(SdkError::SerializationError)
        } else {
            Err(self.handle_error_response(status, &text, retry_after))
        }
    }

    /// Send, retrying transient failures with capped exponential backoff.
    ///
    /// Once retries run out a 429 or 5xx response is handed back for the
    /// caller to turn into an error.
    async fn execute_with_retry(
        &self,
        method: Method,
        path: &str,
        body_json: String,
    ) -> SdkResult<Response> {
        let url = self.url(path);
        let max_retries = self.config.max_retries;
        let mut backoff = self.config.retry_initial_backoff;
        let mut attempt = 0;

        loop {
            let outcome = self.send_once(&method, &url, &body_json).await?;
            let exhausted = attempt >= max_retries;

            let wait = match outcome {
                Attempt::Finished(response) => return Ok(response),
                Attempt::Retryable { response, .. } if exhausted => return Ok(response),
                Attempt::Transient(err) if exhausted => return Err(err),
                Attempt::Retryable { response, wait } => {
                    warn!(status = response.status().as_u16(), "Retryable response from {}", url);
                    wait.unwrap_or(backoff)
                }
                Attempt::Transient(err) => {
                    warn!(error = %err, "Request to {} failed", url);
                    backoff
                }
            };

            let wait = wait.min(self.config.retry_max_backoff);
            attempt += 1;
            info!("Retrying request (attempt {}/{}), waiting {:?}", attempt, max_retries, wait);
            tokio::time::sleep(wait).await;
            backoff = (backoff * 2).min(self.config.retry_max_backoff);
        }
    }

    async fn send_once(&self, method: &Method, url: &str, body: &str) -> SdkResult<Attempt> {
        let request = self
            .add_auth(self.client.request(method.clone(), url))
            .body(body.to_owned());

        debug!(%method, url, body, "Sending request");

        match request.send().await {
            Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                let wait = retry_after(&response).map(Duration::from_secs);
                Ok(Attempt::Retryable { response, wait })
            }
            Ok(response) if response.status().is_server_error() => {
                Ok(Attempt::Retryable { response, wait: None })
            }
            Ok(response) => Ok(Attempt::Finished(response)),
            Err(e) if e.is_timeout() => Ok(Attempt::Transient(SdkError::Timeout(
                self.config.timeout.as_secs(),
            ))),
            Err(e) if e.is_connect() || e.is_request() => {
                Ok(Attempt::Transient(SdkError::NetworkError(e)))
            }
            Err(e) => Err(SdkError::NetworkError(e)),
        }
    }

    fn add_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            AuthConfig::None => request,
            AuthConfig::BearerToken(token) => {
                request.header(header::AUTHORIZATION, format!("Bearer {}", token))
            }
        }
    }

    fn handle_error_response(
        &self,
        status: StatusCode,
        body: &str,
        retry_after: Option<u64>,
    ) -> SdkError {
        warn!(status = status.as_u16(), "Upstream returned an error response");
        match SdkError::from_response(status.as_u16(), body) {
            SdkError::RateLimited { .. } => SdkError::RateLimited {
                retry_after: retry_after.unwrap_or(60),
            },
            other => other,
        }
    }
}

/// Outcome of a single send.
enum Attempt {
    Finished(Response),
    /// 429 or 5xx; `wait` comes from `Retry-After` when present.
    Retryable { response: Response, wait: Option<Duration> },
    /// Timeout or connection failure.
    Transient(SdkError),
}

fn retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let config = SdkConfig::new("https://compute.example.com/");
        let client = HttpClient::new(config).unwrap();

        assert_eq!(
            client.url("/hypothesis-test"),
            "https://compute.example.com/hypothesis-test"
        );
        assert_eq!(
            client.url("hypothesis-test"),
            "https://compute.example.com/hypothesis-test"
        );
    }

    #[test]
    fn test_invalid_custom_header_is_rejected() {
        let config = SdkConfig::new("https://compute.example.com").with_header("bad header", "x");
        assert!(matches!(
            HttpClient::new(config),
            Err(SdkError::ConfigurationError(_))
        ));
    }
}
