//! Compute backends: the in-process engine or a remote service.

use std::time::Instant;

use async_trait::async_trait;
use hypostats_core::{HypothesisTestRequest, HypothesisTestResponse};
use hypostats_engine::HypothesisTestEngine;
use hypostats_sdk::ComputeClient;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::observability::TestMetrics;

/// Turns a wire request into a wire response.
#[async_trait]
pub trait TestBackend: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn run(&self, request: HypothesisTestRequest) -> ApiResult<HypothesisTestResponse>;
}

/// Runs the engine on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend {
    engine: HypothesisTestEngine,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TestBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn run(&self, request: HypothesisTestRequest) -> ApiResult<HypothesisTestResponse> {
        let engine = self.engine;
        let started = Instant::now();

        let result = tokio::task::spawn_blocking(move || -> hypostats_core::Result<_> {
            let request = request.into_test_request()?;
            engine.run(&request)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("engine task failed: {}", e)))??;

        TestMetrics::record_duration(self.name(), started.elapsed());
        Ok(result.into())
    }
}

/// Forwards requests to another service speaking the same contract.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: ComputeClient,
}

impl RemoteBackend {
    pub fn new(client: ComputeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TestBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn run(&self, request: HypothesisTestRequest) -> ApiResult<HypothesisTestResponse> {
        let started = Instant::now();
        debug!(url = %self.client.base_url(), "Forwarding to remote backend");

        let response = self
            .client
            .run(&request)
            .await
            .map_err(ApiError::from_compute)?;

        TestMetrics::record_duration(self.name(), started.elapsed());
        Ok(response)
    }
}
