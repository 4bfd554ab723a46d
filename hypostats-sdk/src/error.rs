//! SDK error types and handling
//!
//! Every failure of an outbound call lands in [`SdkError`], whether it is a
//! transport problem, an upstream status code or a reply that cannot be
//! understood.

use thiserror::Error;

/// The main error type for the SDK
#[derive(Error, Debug)]
pub enum SdkError {
    /// Upstream rejected the request with a status not covered below
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Upstream rejected the request as invalid (HTTP 400/422)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Request timed out
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// HTTP 401
    #[error("Unauthorized: {0}")]
    AuthenticationError(String),

    /// HTTP 402
    #[error("Payment required: {0}")]
    PaymentRequired(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Upstream 5xx
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// A 2xx reply whose content is not what the caller expects
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type alias for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;

/// Error body returned by the hypothesis-test service.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// `error` followed by `details` when present.
    pub fn message(&self) -> String {
        match &self.details {
            None | Some(serde_json::Value::Null) => self.error.clone(),
            Some(serde_json::Value::String(details)) => format!("{}: {}", self.error, details),
            Some(details) => format!("{}: {}", self.error, details),
        }
    }
}

impl SdkError {
    /// Create an error from a non-success status and its body
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map(|parsed| parsed.message())
            .unwrap_or_else(|_| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            400 | 422 => SdkError::ValidationError(message),
            401 => SdkError::AuthenticationError("invalid API key".to_string()),
            402 => SdkError::PaymentRequired(
                "check the API key balance or billing settings".to_string(),
            ),
            429 => SdkError::RateLimited { retry_after: 60 },
            500..=599 => SdkError::ServerError { status, message },
            _ => SdkError::ApiError { status, message },
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SdkError::NetworkError(_)
                | SdkError::Timeout(_)
                | SdkError::RateLimited { .. }
                | SdkError::ServerError { .. }
        )
    }

    /// The upstream could not be reached at all, as opposed to answering
    /// with an error.
    pub fn is_unreachable(&self) -> bool {
        match self {
            SdkError::Timeout(_) => true,
            SdkError::NetworkError(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_json_response() {
        let body = r#"{"error": "Validation error", "details": "pValue: must be between 0 and 1"}"#;
        let error = SdkError::from_response(400, body);

        match error {
            SdkError::ValidationError(message) => {
                assert_eq!(message, "Validation error: pValue: must be between 0 and 1")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_from_plain_body() {
        let error = SdkError::from_response(502, "bad gateway");
        assert!(matches!(error, SdkError::ServerError { status: 502, ref message } if message == "bad gateway"));

        let empty = SdkError::from_response(418, "");
        assert!(matches!(empty, SdkError::ApiError { ref message, .. } if message == "HTTP 418"));
    }

    #[test]
    fn test_status_specific_messages() {
        assert_eq!(
            SdkError::from_response(401, "").to_string(),
            "Unauthorized: invalid API key"
        );
        assert!(SdkError::from_response(402, "")
            .to_string()
            .starts_with("Payment required"));
        assert!(SdkError::from_response(429, "")
            .to_string()
            .starts_with("Rate limit exceeded"));
    }

    #[test]
    fn test_error_is_retryable() {
        assert!(SdkError::RateLimited { retry_after: 1 }.is_retryable());
        assert!(SdkError::Timeout(30).is_retryable());
        assert!(!SdkError::ValidationError("bad".to_string()).is_retryable());
        assert!(!SdkError::MalformedResponse("no json".to_string()).is_retryable());
    }

    #[test]
    fn test_error_is_unreachable() {
        assert!(SdkError::Timeout(5).is_unreachable());
        assert!(!SdkError::PaymentRequired(String::new()).is_unreachable());
    }
}
