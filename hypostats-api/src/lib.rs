//! HTTP surface of hypostats.
//!
//! `POST /hypothesis-test` runs a test through the configured
//! [`TestBackend`]; `POST /analyze-question` turns a word problem into test
//! parameters; `GET /health` and `GET /metrics` serve operations.

pub mod analyzer;
pub mod backend;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod resilience;

use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use analyzer::QuestionAnalysis;
pub use backend::{LocalBackend, RemoteBackend, TestBackend};
pub use error::{ApiError, ApiResult};
pub use resilience::TimeoutConfig;

use observability::{metrics_handler, request_logging_middleware, MetricsLayer};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn TestBackend>,
    pub analyzer: Option<Arc<dyn QuestionAnalysis>>,
    pub timeouts: TimeoutConfig,
}

impl AppState {
    pub fn new(backend: Arc<dyn TestBackend>) -> Self {
        Self {
            backend,
            analyzer: None,
            timeouts: TimeoutConfig::default(),
        }
    }

    /// State backed by the in-process engine.
    pub fn local() -> Self {
        Self::new(Arc::new(LocalBackend::new()))
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn QuestionAnalysis>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }
}

/// Test and analysis endpoints.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/hypothesis-test", post(handlers::hypothesis::run_test))
        .route("/analyze-question", post(handlers::analyze::analyze_question))
        .with_state(state)
}

/// Full application: API routes, operational endpoints and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(metrics_handler))
        .merge(routes(state))
        .layer(MetricsLayer::default())
        .layer(from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
