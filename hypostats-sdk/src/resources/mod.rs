//! Resource clients, one per upstream service.

pub mod analyzer;
pub mod compute;

pub use analyzer::QuestionAnalyzer;
pub use compute::ComputeClient;
