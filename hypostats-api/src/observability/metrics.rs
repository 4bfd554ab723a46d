//! Prometheus metrics
//!
//! - HTTP request count and latency, collected by [`MetricsLayer`]
//! - test outcomes by test type and decision
//! - errors by kind
//! - `/metrics` scrape endpoint
//!
//! # Example
//!
//! ```rust,ignore
//! use hypostats_api::observability::metrics::{init_metrics, metrics_handler, MetricsLayer};
//! use axum::{Router, routing::get};
//!
//! init_metrics().expect("Failed to initialize metrics");
//!
//! let app: Router<()> = Router::new()
//!     .route("/metrics", get(metrics_handler))
//!     .layer(MetricsLayer::default());
//! ```

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::{
    collections::HashSet,
    future::Future,
    pin::Pin,
    sync::{Arc, OnceLock},
    task::{Context, Poll},
    time::{Duration, Instant},
};
use thiserror::Error;
use tower::{Layer, Service};
use tracing::error;

/// Installed exporter, or the reason installation failed.
static PROMETHEUS_HANDLE: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

#[derive(Debug, Clone, Error)]
pub enum MetricsError {
    #[error("Failed to install metrics exporter: {0}")]
    Installation(String),
}

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init_metrics() -> Result<(), MetricsError> {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .set_buckets_for_metric(
                    Matcher::Prefix("http_request_duration".to_string()),
                    &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
                )
                .map_err(|e| e.to_string())?
                .set_buckets_for_metric(
                    Matcher::Prefix("hypothesis_test_duration".to_string()),
                    &[0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0],
                )
                .map_err(|e| e.to_string())?
                .install_recorder()
                .map_err(|e| e.to_string())?;

            register_metric_descriptions();
            Ok(handle)
        })
        .as_ref()
        .map(|_| ())
        .map_err(|e| MetricsError::Installation(e.clone()))
}

fn register_metric_descriptions() {
    describe_counter!(
        "http_requests_total",
        Unit::Count,
        "Total number of HTTP requests received"
    );
    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "hypothesis_tests_total",
        Unit::Count,
        "Completed hypothesis tests by test type and decision"
    );
    describe_counter!(
        "hypothesis_test_errors_total",
        Unit::Count,
        "Failed requests by error kind"
    );
    describe_histogram!(
        "hypothesis_test_duration_seconds",
        Unit::Seconds,
        "Time spent in the compute backend"
    );
}

/// Axum handler returning the Prometheus text exposition.
pub async fn metrics_handler() -> Response {
    match PROMETHEUS_HANDLE.get() {
        Some(Ok(handle)) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        _ => {
            error!("Metrics handler called but metrics not initialized");
            (StatusCode::INTERNAL_SERVER_ERROR, "Metrics not initialized").into_response()
        }
    }
}

/// Records HTTP request metrics
pub struct HttpMetrics {
    method: String,
    path: String,
    status: String,
}

impl HttpMetrics {
    pub fn new(method: &str, path: &str, status: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            status: status.to_string(),
        }
    }

    pub fn finish(self, duration: Duration) {
        histogram!(
            "http_request_duration_seconds",
            "method" => self.method.clone(),
            "path" => self.path.clone()
        )
        .record(duration.as_secs_f64());
        counter!(
            "http_requests_total",
            "method" => self.method,
            "path" => self.path,
            "status" => self.status
        )
        .increment(1);
    }
}

/// Hypothesis test metrics
pub struct TestMetrics;

impl TestMetrics {
    /// `decision` is "reject" or "fail_to_reject".
    pub fn record_outcome(test_type: &str, decision: &'static str) {
        counter!(
            "hypothesis_tests_total",
            "test_type" => test_type.to_string(),
            "decision" => decision
        )
        .increment(1);
    }

    pub fn record_error(kind: &'static str) {
        counter!("hypothesis_test_errors_total", "kind" => kind).increment(1);
    }

    pub fn record_duration(backend: &'static str, duration: Duration) {
        histogram!("hypothesis_test_duration_seconds", "backend" => backend)
            .record(duration.as_secs_f64());
    }
}

/// Configuration for the metrics middleware
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Paths to exclude from metrics collection
    pub excluded_paths: HashSet<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        let mut excluded_paths = HashSet::new();
        excluded_paths.insert("/health".to_string());
        excluded_paths.insert("/metrics".to_string());

        Self { excluded_paths }
    }
}

impl MetricsConfig {
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths.contains(path)
    }
}

/// Tower layer for automatic HTTP metrics collection
#[derive(Clone, Default)]
pub struct MetricsLayer {
    config: Arc<MetricsConfig>,
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsMiddleware {
            inner,
            config: self.config.clone(),
        }
    }
}

/// Middleware service for collecting HTTP metrics
#[derive(Clone)]
pub struct MetricsMiddleware<S> {
    inner: S,
    config: Arc<MetricsConfig>,
}

impl<S> Service<Request> for MetricsMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let excluded = self.config.is_excluded(&path);

        let future = self.inner.call(req);

        Box::pin(async move {
            let response = future.await?;

            if !excluded {
                let status = response.status().as_u16().to_string();
                HttpMetrics::new(&method, &path, &status).finish(start.elapsed());
            }

            Ok(response)
        })
    }
}
