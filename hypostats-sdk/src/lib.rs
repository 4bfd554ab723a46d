//! Hypostats SDK
//!
//! Outbound HTTP clients used by the hypostats server and CLI:
//!
//! - [`ComputeClient`] forwards test requests to a remote hypothesis-test
//!   service speaking the same JSON contract as the local engine.
//! - [`QuestionAnalyzer`] asks an OpenAI-compatible chat model to turn a
//!   word problem into test parameters.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hypostats_sdk::{ComputeClient, SdkConfig};
//! use hypostats_core::{HypothesisTestRequest, TailDirection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ComputeClient::from_config(SdkConfig::new("http://localhost:8000"))?;
//!
//!     let request = HypothesisTestRequest {
//!         num_samples: Some(1),
//!         claim_type: Some(1),
//!         csv_data: Some("4.1\n3.9\n4.4\n4.0".to_string()),
//!         hypothesized_value: Some(4.0),
//!         claim_direction: Some(TailDirection::Greater),
//!         ..Default::default()
//!     };
//!
//!     let response = client.run(&request).await?;
//!     println!("{}", response.conclusion);
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod resources;

pub use client::HttpClient;
pub use config::{
    AnalyzerSettings, AuthConfig, SdkConfig, DEFAULT_ANALYZER_BASE_URL, DEFAULT_ANALYZER_MODEL,
};
pub use error::{ApiErrorBody, SdkError, SdkResult};
pub use resources::analyzer::{build_prompt, parse_analysis, AnalyzedQuestion, QuestionAnalyzer};
pub use resources::compute::{ComputeClient, HYPOTHESIS_TEST_PATH};
