use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use hypostats_api::{
    resilience::{TimeoutConfig, ANALYZE_OPERATION},
    AppState, LocalBackend, RemoteBackend, TestBackend,
};
use hypostats_sdk::{AnalyzerSettings, ComputeClient, QuestionAnalyzer, SdkConfig};
use tracing::{info, warn};

use crate::config::{BackendMode, Config};

/// Room left for the analyzer beyond its own HTTP timeout.
const ANALYZE_GRACE: Duration = Duration::from_secs(5);

pub fn build_state(config: &Config) -> Result<AppState> {
    let request_timeout = Duration::from_secs(config.request_timeout_secs);

    let backend: Arc<dyn TestBackend> = match config.backend.mode {
        BackendMode::Local => Arc::new(LocalBackend::new()),
        BackendMode::Remote => {
            let url = config
                .backend
                .url
                .clone()
                .context("backend.url is required in remote mode")?;
            let sdk_config = SdkConfig::new(url)
                .with_timeout(request_timeout)
                .with_max_retries(config.backend.max_retries);
            let client = ComputeClient::from_config(sdk_config)
                .context("failed to build remote compute client")?;
            Arc::new(RemoteBackend::new(client))
        }
    };
    info!(backend = backend.name(), "Compute backend ready");

    let mut analyze_timeout = request_timeout;
    let mut state = AppState::new(backend);

    match config.analyzer.api_key.as_deref() {
        Some(key) => {
            let mut settings = AnalyzerSettings::new(key)
                .with_base_url(config.analyzer.base_url.clone())
                .with_model(config.analyzer.model.clone());
            settings.referer = config.analyzer.referer.clone();
            settings.title = config.analyzer.title.clone();
            analyze_timeout = settings.timeout + ANALYZE_GRACE;

            let analyzer = QuestionAnalyzer::from_settings(&settings)
                .context("failed to build question analyzer")?;
            info!(model = analyzer.model(), "Question analyzer ready");
            state = state.with_analyzer(Arc::new(analyzer));
        }
        None => warn!("No analyzer API key configured, /analyze-question will return 503"),
    }

    Ok(state.with_timeouts(
        TimeoutConfig::new(request_timeout).with_operation(ANALYZE_OPERATION, analyze_timeout),
    ))
}
