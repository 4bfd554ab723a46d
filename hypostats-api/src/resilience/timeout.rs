//! Request-level deadlines.
//!
//! Every handler wraps its backend call in [`with_timeout`] using the
//! duration configured for its operation. An elapsed deadline becomes a 503.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

/// Operation name for `POST /hypothesis-test`.
pub const TEST_OPERATION: &str = "hypothesis-test";

/// Operation name for `POST /analyze-question`.
pub const ANALYZE_OPERATION: &str = "analyze-question";

/// Timeout configuration
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Default timeout for all operations
    pub default: Duration,
    /// Operation-specific timeouts
    pub operation_specific: HashMap<String, Duration>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl TimeoutConfig {
    pub fn new(default: Duration) -> Self {
        Self {
            default,
            operation_specific: HashMap::new(),
        }
    }

    /// Add an operation-specific timeout
    pub fn with_operation(mut self, operation: impl Into<String>, timeout: Duration) -> Self {
        self.operation_specific.insert(operation.into(), timeout);
        self
    }

    /// Get timeout for a specific operation
    pub fn get_timeout(&self, operation: &str) -> Duration {
        self.operation_specific
            .get(operation)
            .copied()
            .unwrap_or(self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeoutError {
    #[error("Operation timed out after {elapsed:?}")]
    Elapsed { elapsed: Duration },
}

/// Run `future` to completion or fail once `duration` has passed.
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    timeout(duration, future)
        .await
        .map_err(|_| TimeoutError::Elapsed { elapsed: duration })
}
