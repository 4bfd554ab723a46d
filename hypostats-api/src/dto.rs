use serde::{Deserialize, Serialize};
use validator::Validate;

pub use hypostats_core::{HypothesisTestRequest, HypothesisTestResponse, TestDetails};
pub use hypostats_sdk::AnalyzedQuestion;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeQuestionRequest {
    #[validate(length(min = 1, max = 10000, message = "must be between 1 and 10000 characters"))]
    pub question_text: String,
}
