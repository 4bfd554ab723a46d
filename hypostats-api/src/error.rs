use std::time::Duration;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hypostats_core::{CoreError, FieldErrors};
use hypostats_sdk::SdkError;
use thiserror::Error;
use validator::ValidationErrors;

use crate::dto::ErrorResponse;
use crate::observability::{current_request_id, TestMetrics};
use crate::resilience::TimeoutError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Computation error: {0}")]
    Computation(String),

    /// The remote compute service answered with an error.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The remote compute service could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to analyze question: {0}")]
    Analysis(String),

    #[error("Question analysis is not configured")]
    AnalyzerNotConfigured,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Label used for the `kind` dimension of the error counter.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Computation(_) => "computation",
            ApiError::Upstream(_) => "upstream",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Timeout(_) => "timeout",
            ApiError::Analysis(_) => "analysis",
            ApiError::AnalyzerNotConfigured => "analyzer_not_configured",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) | ApiError::Timeout(_) | ApiError::AnalyzerNotConfigured => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Computation(_)
            | ApiError::Upstream(_)
            | ApiError::Analysis(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a failed call to the remote compute service.
    pub fn from_compute(err: SdkError) -> Self {
        if err.is_unreachable() {
            return ApiError::Unavailable(err.to_string());
        }
        match err {
            SdkError::ValidationError(message)
            | SdkError::ApiError { message, .. }
            | SdkError::ServerError { message, .. } => ApiError::Upstream(message),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => ApiError::Validation(errors),
            CoreError::Computation(message) => ApiError::Computation(message),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::from(errors).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<TimeoutError> for ApiError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Elapsed { elapsed } => ApiError::Timeout(elapsed),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, details) = match &self {
            ApiError::Validation(errors) => ("Validation error", Some(errors.to_string())),
            ApiError::BadRequest(msg) => ("Bad request", Some(msg.clone())),
            ApiError::Computation(msg) => ("Computation error", Some(msg.clone())),
            ApiError::Upstream(msg) => ("Hypothesis test service error", Some(msg.clone())),
            ApiError::Unavailable(msg) => ("Hypothesis test service unavailable", Some(msg.clone())),
            ApiError::Timeout(elapsed) => (
                "Request timed out",
                Some(format!("no result within {:?}", elapsed)),
            ),
            ApiError::Analysis(msg) => ("Failed to analyze question", Some(msg.clone())),
            ApiError::AnalyzerNotConfigured => (
                "Failed to analyze question",
                Some("no analyzer API key is configured".to_string()),
            ),
            ApiError::Internal(msg) => ("Internal server error", Some(msg.clone())),
        };

        let request_id = current_request_id();
        if status.is_server_error() {
            tracing::error!(request.id = ?request_id, kind = self.kind(), "{}", self);
        } else {
            tracing::debug!(request.id = ?request_id, kind = self.kind(), "{}", self);
        }
        TestMetrics::record_error(self.kind());

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
