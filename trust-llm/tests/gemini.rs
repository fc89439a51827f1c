mod common;

use std::time::Duration;

use serde_json::json;
use trust_common::TrustError;
use trust_llm::gemini::GeminiClient;
use trust_llm::retry::{classify, parse_retry_hint, ErrorClass};
use trust_llm::traits::LlmClient;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

async fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::with_base_url(
        &format!("{}/v1beta", server.uri()),
        "test-key".into(),
        "gemini-1.5-flash".into(),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn generate_joins_candidate_parts_and_reads_usage() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "maxOutputTokens": 400 },
            "systemInstruction": { "parts": [{ "text": "be careful" }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "[\"a\"," }, { "text": " \"b\"]" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 42 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let resp = client
        .generate("claims please", Some("be careful"), Some(400), Some(0.3))
        .await
        .unwrap();

    assert_eq!(resp.text, "[\"a\", \"b\"]");
    assert_eq!(resp.tokens_used, Some(42));
    assert_eq!(client.model_name(), "gemini-1.5-flash");
}

#[tokio::test]
async fn rate_limit_body_keeps_wording_and_retry_delay() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "Resource has been exhausted (e.g. check quota).",
                "status": "RESOURCE_EXHAUSTED",
                "details": [{
                    "@type": "type.googleapis.com/google.rpc.RetryInfo",
                    "retryDelay": "7s"
                }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.generate("x", None, None, None).await.unwrap_err();
    let text = err.to_string();

    assert!(matches!(err, TrustError::Provider(_)));
    assert!(text.contains("RESOURCE_EXHAUSTED"), "{text}");
    assert_eq!(classify(&text), ErrorClass::RateLimited);
    assert_eq!(parse_retry_hint(&text), Some(Duration::from_secs(7)));
}

#[tokio::test]
async fn blocked_prompt_is_a_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.generate("x", None, None, None).await.unwrap_err();
    assert!(err.to_string().contains("Prompt blocked"));
}

#[tokio::test]
async fn empty_candidate_text_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "STOP" }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.generate("x", None, None, None).await.unwrap_err();
    assert!(err.to_string().contains("Empty response"));
}
