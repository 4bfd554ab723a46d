use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigLoader, Environment, File};
use hypostats_api::observability::LogFormat;
use hypostats_sdk::{DEFAULT_ANALYZER_BASE_URL, DEFAULT_ANALYZER_MODEL};
use serde::Deserialize;

const ENV_PREFIX: &str = "HYPOSTATS";

/// Read when `analyzer.api_key` is not configured.
const ANALYZER_KEY_FALLBACK: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub request_timeout_secs: u64,
    pub backend: BackendConfig,
    pub analyzer: AnalyzerConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,
    /// Base URL of the remote service, required in remote mode.
    pub url: Option<String>,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub referer: Option<String>,
    pub title: Option<String>,
}

impl Config {
    /// Layered load: `config/default`, `config/local`, then `HYPOSTATS_*`
    /// variables (`HYPOSTATS_BACKEND__MODE=remote`).
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new("config"), Some(ENV_PREFIX))?;
        if config.analyzer.api_key.is_none() {
            config.analyzer.api_key = std::env::var(ANALYZER_KEY_FALLBACK)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
        Ok(config)
    }

    pub fn load_from(dir: &Path, env_prefix: Option<&str>) -> Result<Self> {
        let mut builder = ConfigLoader::builder()
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join("local")).required(false));

        if let Some(prefix) = env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config: Self = builder
            .build()
            .context("failed to read configuration sources")?
            .try_deserialize()
            .context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.backend.mode == BackendMode::Remote && self.backend.url.is_none() {
            anyhow::bail!("backend.url is required when backend.mode is \"remote\"");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            request_timeout_secs: 30,
            backend: BackendConfig::default(),
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Local,
            url: None,
            max_retries: 2,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ANALYZER_BASE_URL.to_string(),
            model: DEFAULT_ANALYZER_MODEL.to_string(),
            referer: None,
            title: Some("Hypothesis Testing App".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path(), None).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.backend.mode, BackendMode::Local);
        assert_eq!(config.analyzer.model, DEFAULT_ANALYZER_MODEL);
        assert!(config.analyzer.api_key.is_none());
    }

    #[test]
    fn test_local_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "port = 8080\nlog_format = \"json\"\n\n[backend]\nmode = \"remote\"\nurl = \"http://compute:8000\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("local.toml"), "port = 9090\n").unwrap();

        let config = Config::load_from(dir.path(), None).unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.backend.mode, BackendMode::Remote);
        assert_eq!(config.backend.url.as_deref(), Some("http://compute:8000"));
        assert_eq!(config.backend.max_retries, 2);
    }

    #[test]
    fn test_remote_mode_requires_url() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[backend]\nmode = \"remote\"\n").unwrap();

        let err = Config::load_from(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("backend.url"));
    }
}
