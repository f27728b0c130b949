mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::db::SubmissionKind;

/// Failure from the LLM provider (transport, auth, quota, malformed
/// response). The provider's message is preserved for logging and for the
/// review record; it is never returned verbatim to API clients.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// A generated review. A missing score is degraded-but-usable output, not a
/// failure: the model sometimes omits the score marker.
#[derive(Debug, Clone)]
pub struct GeneratedReview {
    pub review_content: String,
    pub overall_score: Option<i32>,
    pub model_used: String,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
}

/// Adapter over a generative-AI provider. Implementations build the prompt,
/// invoke the model once (no internal retries) and parse the response; they
/// never touch the review record.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate_review(
        &self,
        exercise_instructions: &str,
        submission_content: &str,
        kind: SubmissionKind,
    ) -> Result<GeneratedReview, ProviderError>;
}
