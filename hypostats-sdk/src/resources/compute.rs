//! Client for a remote hypothesis-test service.
//!
//! The service speaks the same wire format as the local engine, so a
//! request can be forwarded without modification.

use std::sync::Arc;

use hypostats_core::{HypothesisTestRequest, HypothesisTestResponse};
use tracing::debug;

use crate::client::HttpClient;
use crate::config::SdkConfig;
use crate::error::SdkResult;

/// Path of the test endpoint relative to the service base URL.
pub const HYPOTHESIS_TEST_PATH: &str = "/hypothesis-test";

#[derive(Debug, Clone)]
pub struct ComputeClient {
    client: Arc<HttpClient>,
}

impl ComputeClient {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    pub fn from_config(config: SdkConfig) -> SdkResult<Self> {
        Ok(Self::new(Arc::new(HttpClient::new(config)?)))
    }

    pub fn base_url(&self) -> &str {
        &self.client.config().base_url
    }

    /// Run a test on the remote service.
    pub async fn run(&self, request: &HypothesisTestRequest) -> SdkResult<HypothesisTestResponse> {
        debug!(
            num_samples = ?request.num_samples,
            claim_type = ?request.claim_type,
            "Forwarding hypothesis test"
        );
        self.client.post(HYPOTHESIS_TEST_PATH, request).await
    }
}
