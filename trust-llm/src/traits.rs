use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trust_common::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// A generative-text provider.
///
/// Implementations are stateless after construction and safe to share
/// read-only across concurrently handled requests behind an `Arc`.
/// Errors must keep the provider's wording (HTTP status, `RESOURCE_EXHAUSTED`,
/// retry hints) because [`crate::retry`] classifies them by text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// System prompt shared by the fact-checking prompts.
    fn default_factcheck_system_prompt(&self) -> &str {
        r#"You are a careful fact-checking analyst who evaluates web content for accuracy and credibility.

Guidelines:
- Rely only on the evidence you are given; never invent sources, quotes, or numbers
- Prefer verifiable, specific statements over opinion or speculation
- Be concise and neutral
- When the evidence is insufficient, say so instead of guessing"#
    }
}
