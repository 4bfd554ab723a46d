use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{AnalyzeQuestionRequest, AnalyzedQuestion},
    error::{ApiError, ApiResult},
    resilience::{with_timeout, ANALYZE_OPERATION},
    AppState,
};

pub async fn analyze_question(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeQuestionRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzedQuestion>> {
    let Json(payload) = payload?;
    if payload.question_text.trim().is_empty() {
        return Err(ApiError::BadRequest("questionText must not be empty".to_string()));
    }
    payload.validate()?;

    let analyzer = state
        .analyzer
        .as_ref()
        .ok_or(ApiError::AnalyzerNotConfigured)?;

    let deadline = state.timeouts.get_timeout(ANALYZE_OPERATION);
    let analysis = with_timeout(deadline, analyzer.analyze(&payload.question_text))
        .await?
        .map_err(|e| ApiError::Analysis(e.to_string()))?;

    info!(
        num_samples = analysis.num_samples,
        claim_type = analysis.claim_type,
        "Question analyzed"
    );
    Ok(Json(analysis))
}
