//! Structured logging, request correlation and Prometheus metrics.

pub mod logging;
pub mod metrics;

pub use logging::{
    current_request_id, init_logging, request_logging_middleware, LogConfig, LogFormat,
    LoggingError, REQUEST_ID_HEADER,
};

pub use metrics::{
    init_metrics, metrics_handler, HttpMetrics, MetricsConfig, MetricsError, MetricsLayer,
    TestMetrics,
};
