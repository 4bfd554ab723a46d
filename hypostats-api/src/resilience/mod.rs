//! Deadlines for request handling.

pub mod timeout;

pub use timeout::{with_timeout, TimeoutConfig, TimeoutError, ANALYZE_OPERATION, TEST_OPERATION};
