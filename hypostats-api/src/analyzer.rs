//! Question analysis behind a trait so handlers can run without network access.

use async_trait::async_trait;
use hypostats_sdk::{AnalyzedQuestion, QuestionAnalyzer, SdkResult};

#[async_trait]
pub trait QuestionAnalysis: Send + Sync {
    async fn analyze(&self, question: &str) -> SdkResult<AnalyzedQuestion>;
}

#[async_trait]
impl QuestionAnalysis for QuestionAnalyzer {
    async fn analyze(&self, question: &str) -> SdkResult<AnalyzedQuestion> {
        QuestionAnalyzer::analyze(self, question).await
    }
}
