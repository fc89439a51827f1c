//! Provider-agnostic LLM integration for Trust Issues.
//!
//! This crate exposes a common [`traits::LlmClient`] interface, concrete
//! Gemini and OpenAI clients, the rate-limit-aware [`retry::RetryingLlm`]
//! wrapper and helpers for pulling JSON out of model replies.
//!
//! # Examples
//! ```no_run
//! use std::time::Duration;
//! use trust_common::{LlmConfig, Result};
//! use trust_llm::build_llm_client;
//!
//! # fn main() -> Result<()> {
//! let cfg = LlmConfig::Gemini {
//!     api_key: "key".into(),
//!     model: trust_llm::DEFAULT_GEMINI_MODEL.into(),
//! };
//! let client = build_llm_client(&cfg, Duration::from_secs(30))?;
//! assert_eq!(client.model_name(), "gemini-1.5-flash");
//! # Ok(())
//! # }
//! ```
pub mod gemini;
pub mod json;
pub mod openai;
pub mod retry;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;
use trust_common::{LlmConfig, TrustError};
use traits::LlmClient;

pub use trust_common::{DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL};

/// Build the configured provider client. `timeout` bounds each HTTP request.
pub fn build_llm_client(
    config: &LlmConfig,
    timeout: Duration,
) -> trust_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        #[cfg(feature = "gemini")]
        LlmConfig::Gemini { api_key, model } => {
            let client = gemini::GeminiClient::new(api_key.clone(), model.clone(), timeout)?;
            Ok(Arc::new(client))
        }
        #[cfg(feature = "openai")]
        LlmConfig::OpenAi {
            api_key,
            model,
            base_url,
        } => {
            let client = openai::OpenAiClient::new(
                api_key.clone(),
                model.clone(),
                base_url.as_deref(),
                timeout,
            )?;
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(TrustError::Config("No LLM configured".to_string())),
        #[allow(unreachable_patterns)]
        _ => Err(TrustError::Config("LLM provider not enabled".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_a_config_error() {
        let err = build_llm_client(&LlmConfig::None, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, TrustError::Config(_)));
    }

    #[test]
    fn empty_key_is_rejected() {
        let cfg = LlmConfig::Gemini {
            api_key: "  ".into(),
            model: DEFAULT_GEMINI_MODEL.into(),
        };
        assert!(build_llm_client(&cfg, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn openai_client_reports_model() {
        let cfg = LlmConfig::OpenAi {
            api_key: "sk-test".into(),
            model: DEFAULT_OPENAI_MODEL.into(),
            base_url: Some("http://localhost:1234/v1".into()),
        };
        let client = build_llm_client(&cfg, Duration::from_secs(1)).unwrap();
        assert_eq!(client.model_name(), DEFAULT_OPENAI_MODEL);
    }
}
