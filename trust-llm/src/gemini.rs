use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;
use trust_common::{Result, TrustError};
use trust_http::{Auth, HttpClient, HttpError, RequestOpts};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    safety_settings: Vec<GeminiSafetySetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GeminiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

// Response schema (v1beta). Every field the API may omit is defaulted so a
// blocked or empty candidate surfaces as a typed error, not a decode failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Google Gemini API client.
///
/// Transport retries are disabled; rate-limit handling belongs to
/// [`crate::retry::RetryingLlm`].
pub struct GeminiClient {
    http: HttpClient,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client using the provided API key and model.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        Self::with_base_url(GEMINI_BASE_URL, api_key, model, timeout)
    }

    /// Point the client at a different API root (proxies, tests).
    pub fn with_base_url(
        base_url: &str,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(TrustError::Config("Gemini API key is empty".to_string()));
        }
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let http = HttpClient::new(&base)
            .map_err(|e| TrustError::Config(format!("Failed to create HTTP client: {e}")))?
            .with_timeout(timeout)
            .with_retries(0);

        Ok(Self {
            http,
            api_key,
            model,
        })
    }

    fn safety_settings() -> Vec<GeminiSafetySetting> {
        SAFETY_CATEGORIES
            .iter()
            .map(|&category| GeminiSafetySetting {
                category,
                threshold: "BLOCK_MEDIUM_AND_ABOVE",
            })
            .collect()
    }
}

fn http_to_trust(e: HttpError) -> TrustError {
    match e {
        HttpError::Timeout(_) => TrustError::Timeout,
        other => TrustError::Provider(format!("Gemini API error: {other}")),
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let path = format!("models/{}:generateContent", self.model);

        let generation_config = (max_tokens.is_some() || temperature.is_some()).then_some(
            GeminiGenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
            },
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
            safety_settings: Self::safety_settings(),
            system_instruction: system_prompt.map(|sys| GeminiContent {
                parts: vec![GeminiPart {
                    text: sys.to_string(),
                }],
            }),
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "gemini.generate");

        let opts = RequestOpts {
            auth: Some(Auth::Query {
                name: "key",
                value: Cow::Borrowed(self.api_key.as_str()),
            }),
            ..Default::default()
        };
        let response: GeminiResponse = self
            .http
            .post_json_opts(&path, &request, opts)
            .await
            .map_err(http_to_trust)?;

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(TrustError::Provider(format!(
                "Prompt blocked by Gemini: {reason}"
            )));
        }

        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| TrustError::Provider("No candidates returned from Gemini".to_string()))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(TrustError::Provider(
                "Content blocked by Gemini safety filters".to_string(),
            ));
        }

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(TrustError::Provider(
                "Empty response from Gemini".to_string(),
            ));
        }

        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used: response.usage_metadata.and_then(|u| u.total_token_count),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
