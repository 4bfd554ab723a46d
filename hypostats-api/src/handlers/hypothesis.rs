use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{HypothesisTestRequest, HypothesisTestResponse},
    error::ApiResult,
    observability::TestMetrics,
    resilience::{with_timeout, TEST_OPERATION},
    AppState,
};

pub async fn run_test(
    State(state): State<AppState>,
    payload: Result<Json<HypothesisTestRequest>, JsonRejection>,
) -> ApiResult<Json<HypothesisTestResponse>> {
    let Json(payload) = payload?;
    payload.validate()?;

    let deadline = state.timeouts.get_timeout(TEST_OPERATION);
    let response = with_timeout(deadline, state.backend.run(payload)).await??;

    let test_type = response.details.test_type.as_deref().unwrap_or("unknown");
    let rejected = response.rejects_null();
    TestMetrics::record_outcome(
        test_type,
        if rejected { "reject" } else { "fail_to_reject" },
    );
    info!(
        backend = state.backend.name(),
        test_type,
        reject_null = rejected,
        "Hypothesis test completed"
    );

    Ok(Json(response))
}
