//! SDK configuration
//!
//! Connection settings shared by every client in this crate, plus the
//! settings for the chat-completion backed question analyzer.

use std::time::Duration;

use crate::error::{SdkError, SdkResult};

/// Default OpenAI-compatible endpoint for question analysis.
pub const DEFAULT_ANALYZER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default chat model for question analysis.
pub const DEFAULT_ANALYZER_MODEL: &str = "meta-llama/llama-3.1-8b-instruct:free";

/// Configuration for the SDK HTTP client
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Base URL for the API
    pub base_url: String,

    /// Authentication method
    pub auth: AuthConfig,

    /// Request timeout
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum number of retries
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_initial_backoff: Duration,

    /// Maximum backoff duration for retries
    pub retry_max_backoff: Duration,

    /// User agent string
    pub user_agent: String,

    /// Custom headers to add to all requests
    pub custom_headers: Vec<(String, String)>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            auth: AuthConfig::None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_initial_backoff: Duration::from_millis(100),
            retry_max_backoff: Duration::from_secs(5),
            user_agent: format!("hypostats-sdk/{}", env!("CARGO_PKG_VERSION")),
            custom_headers: Vec::new(),
        }
    }
}

impl SdkConfig {
    /// Create a new configuration with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthConfig::BearerToken(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the retry backoff window
    pub fn with_retry_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.retry_initial_backoff = initial;
        self.retry_max_backoff = max;
        self
    }

    /// Add a custom header to all requests
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> SdkResult<()> {
        if self.base_url.is_empty() {
            return Err(SdkError::ConfigurationError(
                "Base URL cannot be empty".to_string(),
            ));
        }

        url::Url::parse(&self.base_url)?;

        if self.timeout.is_zero() {
            return Err(SdkError::ConfigurationError(
                "Timeout cannot be zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// No authentication
    None,

    /// Sent as `Authorization: Bearer <token>`
    BearerToken(String),
}

/// Settings for the question analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Sent as `HTTP-Referer`, used by OpenRouter for attribution.
    pub referer: Option<String>,
    /// Sent as `X-Title`.
    pub title: Option<String>,
    pub timeout: Duration,
}

impl AnalyzerSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_ANALYZER_BASE_URL.to_string(),
            model: DEFAULT_ANALYZER_MODEL.to_string(),
            referer: None,
            title: Some("Hypothesis Testing App".to_string()),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// HTTP configuration for the chat-completion endpoint.
    ///
    /// Upstream failures are reported straight back to the caller, so the
    /// analyzer does not retry.
    pub fn to_sdk_config(&self) -> SdkResult<SdkConfig> {
        if self.api_key.trim().is_empty() {
            return Err(SdkError::ConfigurationError(
                "analyzer API key is not set".to_string(),
            ));
        }

        let mut config = SdkConfig::new(self.base_url.clone())
            .with_bearer_token(self.api_key.clone())
            .with_timeout(self.timeout)
            .with_max_retries(0);
        if let Some(referer) = &self.referer {
            config = config.with_header("HTTP-Referer", referer.clone());
        }
        if let Some(title) = &self.title {
            config = config.with_header("X-Title", title.clone());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SdkConfig::default();
        assert_eq!(config.max_retries, 2);
        assert!(matches!(config.auth, AuthConfig::None));
    }

    #[test]
    fn test_config_chain() {
        let config = SdkConfig::new("https://compute.example.com")
            .with_bearer_token("test-token")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.base_url, "https://compute.example.com");
        assert!(matches!(config.auth, AuthConfig::BearerToken(_)));
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_config() {
        assert!(SdkConfig::new("").validate().is_err());
        assert!(SdkConfig::new("not a url").validate().is_err());
        assert!(SdkConfig::new("http://localhost:8000")
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_analyzer_settings_headers() {
        let config = AnalyzerSettings::new("sk-test")
            .with_referer("https://stats.example.com")
            .to_sdk_config()
            .unwrap();

        assert_eq!(config.base_url, DEFAULT_ANALYZER_BASE_URL);
        assert_eq!(config.max_retries, 0);
        assert!(matches!(config.auth, AuthConfig::BearerToken(ref t) if t == "sk-test"));
        assert!(config
            .custom_headers
            .iter()
            .any(|(name, value)| name == "HTTP-Referer" && value == "https://stats.example.com"));
        assert!(config.custom_headers.iter().any(|(name, _)| name == "X-Title"));
    }

    #[test]
    fn test_analyzer_requires_key() {
        let err = AnalyzerSettings::new("  ").to_sdk_config().unwrap_err();
        assert!(matches!(err, SdkError::ConfigurationError(_)));
    }
}
