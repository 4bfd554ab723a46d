mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use hypostats_api::{app, AppState, QuestionAnalysis};
use hypostats_core::TailDirection;
use hypostats_sdk::{AnalyzedQuestion, AnalyzerSettings, QuestionAnalyzer, SdkError, SdkResult};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use common::post_json;

struct FailingAnalyzer;

#[async_trait]
impl QuestionAnalysis for FailingAnalyzer {
    async fn analyze(&self, _question: &str) -> SdkResult<AnalyzedQuestion> {
        Err(SdkError::RateLimited { retry_after: 60 })
    }
}

struct FixedAnalyzer;

#[async_trait]
impl QuestionAnalysis for FixedAnalyzer {
    async fn analyze(&self, _question: &str) -> SdkResult<AnalyzedQuestion> {
        Ok(AnalyzedQuestion {
            num_samples: 1,
            claim_type: 1,
            p_value: 0.05,
            is_known: "yes".to_string(),
            hypothesized_value: 500.0,
            known_param: Some(15.0),
            known_param2: None,
            claim_direction: TailDirection::Equal,
            explanation: None,
        })
    }
}

const QUESTION: &str = "A sample of 25 bulbs has mean life 495 hours. Is the mean different from 500 at 5%? sigma = 15.";

#[tokio::test]
async fn test_analyzer_not_configured() {
    let (status, body) = post_json(
        app(AppState::local()),
        "/analyze-question",
        &json!({"questionText": QUESTION}),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Failed to analyze question");
}

#[tokio::test]
async fn test_blank_question_is_bad_request() {
    let state = AppState::local().with_analyzer(Arc::new(FixedAnalyzer));
    let (status, _) = post_json(app(state), "/analyze-question", &json!({"questionText": "   "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analysis_result_is_returned_in_form_shape() {
    let state = AppState::local().with_analyzer(Arc::new(FixedAnalyzer));
    let (status, body) = post_json(app(state), "/analyze-question", &json!({"questionText": QUESTION})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["numSamples"], 1);
    assert_eq!(body["isKnown"], "yes");
    assert_eq!(body["knownParam"], 15.0);
    assert_eq!(body["claimDirection"], "equal");
    assert!(body.get("knownParam2").is_none());
}

#[tokio::test]
async fn test_analysis_failure_is_internal_error() {
    let state = AppState::local().with_analyzer(Arc::new(FailingAnalyzer));
    let (status, body) = post_json(app(state), "/analyze-question", &json!({"questionText": QUESTION})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to analyze question");
    assert!(body["details"].as_str().unwrap().contains("Rate limit"));
}

#[tokio::test]
async fn test_openrouter_round_trip() {
    let server = MockServer::start().await;
    let reply = "Here is the analysis:\n{\"numSamples\": \"1\", \"claimType\": 1, \"pValue\": 0.05, \
                 \"isKnown\": \"yes\", \"hypothesizedValue\": 500, \"knownParam\": 15, \
                 \"knownParam2\": null, \"claimDirection\": \"equal\"}";
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": reply}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = AnalyzerSettings::new("test-key").with_base_url(server.uri());
    let analyzer = QuestionAnalyzer::from_settings(&settings).unwrap();
    let state = AppState::local().with_analyzer(Arc::new(analyzer));

    let (status, body) = post_json(app(state), "/analyze-question", &json!({"questionText": QUESTION})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["numSamples"], 1);
    assert_eq!(body["hypothesizedValue"], 500.0);
    assert_eq!(body["claimDirection"], "equal");
}
