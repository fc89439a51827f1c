//! Tolerant extraction of JSON payloads from model replies.
//!
//! Models often wrap JSON in markdown fences or add a sentence before it.
//! These helpers peel that off; the payload itself is still decoded
//! strictly with serde.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use trust_common::{Result, TrustError};

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").ok())
        .as_ref()
}

/// Return the body of the first fenced block, or the trimmed text as-is.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    fence_regex()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(trimmed)
}

/// Locate the outermost JSON array in a reply.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let body = strip_code_fences(text);
    let start = body.find('[')?;
    let end = body.rfind(']')?;
    (end > start).then(|| &body[start..=end])
}

/// Decode a JSON array out of a model reply.
///
/// ```
/// let fenced = "```json\n[\"a\", \"b\"]\n```";
/// let plain = "[\"a\", \"b\"]";
/// let a: Vec<String> = trust_llm::json::parse_json_array(fenced).unwrap();
/// let b: Vec<String> = trust_llm::json::parse_json_array(plain).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_json_array<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let slice = extract_json_array(text)
        .ok_or_else(|| TrustError::Parse("reply does not contain a JSON array".to_string()))?;
    serde_json::from_str(slice).map_err(|e| TrustError::Parse(format!("invalid JSON array: {e}")))
}
