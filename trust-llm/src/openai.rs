use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trust_common::{Result, TrustError};
use trust_http::{HttpClient, HttpError};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

/// Client for OpenAI-compatible `responses` endpoints.
pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ResponsesApiRequest<'a> {
    model: &'a str,
    input: &'a str,
    instructions: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiResponse {
    model: String,
    #[serde(default)]
    output: Vec<ResponseMessage>,
    #[serde(default)]
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Vec<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl OpenAiClient {
    /// Create a new client. `base_url` overrides the public API root for
    /// gateways and compatible providers.
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(TrustError::Config("OpenAI API key is empty".to_string()));
        }
        let base = match base_url {
            Some(url) if url.ends_with('/') => url.to_string(),
            Some(url) => format!("{url}/"),
            None => OPENAI_API_BASE.to_string(),
        };
        let client = HttpClient::new(&base)
            .map_err(|e| TrustError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(timeout)
            .with_retries(0);

        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let req = ResponsesApiRequest {
            model: &self.model,
            input: prompt,
            instructions: system_prompt.unwrap_or("You are an objective, careful fact-checker."),
            temperature,
            max_output_tokens: max_tokens,
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "openai.generate");

        let resp: ResponsesApiResponse = self
            .client
            .post_json("responses", Some(&self.api_key), &req)
            .await
            .map_err(http_to_trust)?;

        let text = resp
            .output
            .iter()
            .flat_map(|msg| &msg.content)
            .find(|c| c.kind == "output_text")
            .map(|c| c.text.clone())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(TrustError::Provider(
                "Empty response from OpenAI".to_string(),
            ));
        }

        Ok(LlmResponse {
            text,
            model: Some(resp.model),
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_trust(e: HttpError) -> TrustError {
    match e {
        HttpError::Timeout(_) => TrustError::Timeout,
        other => TrustError::Provider(format!("OpenAI API error: {other}")),
    }
}
