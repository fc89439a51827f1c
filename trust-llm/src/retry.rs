//! Rate-limit-aware retry around an [`LlmClient`].
//!
//! Provider errors are classified by their text: quota exhaustion fails at
//! once, rate limiting is retried after the provider's suggested delay (or
//! exponential backoff with jitter), anything else is returned unchanged.
//! Waits are async and race a request-scoped [`CancellationToken`].

use crate::traits::{LlmClient, LlmResponse};
use rand::Rng;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use trust_common::{Result, TrustError};

const RATE_LIMIT_MARKERS: [&str; 6] = [
    "429",
    "rate limit",
    "too many requests",
    "quota exceeded",
    "resource_exhausted",
    "please retry",
];

// Always terminal, even when the provider also sends a retry hint.
const HARD_QUOTA_MARKERS: [&str; 5] = [
    "insufficient_quota",
    "quota has been exhausted",
    "per day",
    "perday",
    "daily limit",
];

// Terminal only when no retry hint accompanies them; Gemini's per-minute
// limit uses this wording together with "Please retry in Ns".
const SOFT_QUOTA_MARKERS: [&str; 2] = ["exceeded your current quota", "billing"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    QuotaExhausted,
    RateLimited,
    Other,
}

/// Classify a provider error by its message text (case-insensitive).
pub fn classify(text: &str) -> ErrorClass {
    let lower = text.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    if has(&HARD_QUOTA_MARKERS[..]) {
        return ErrorClass::QuotaExhausted;
    }
    if has(&SOFT_QUOTA_MARKERS[..]) && parse_retry_hint(text).is_none() {
        return ErrorClass::QuotaExhausted;
    }
    if has(&RATE_LIMIT_MARKERS[..]) || has(&SOFT_QUOTA_MARKERS[..]) {
        return ErrorClass::RateLimited;
    }
    ErrorClass::Other
}

fn hint_regex() -> Option<&'static Regex> {
    static HINT: OnceLock<Option<Regex>> = OnceLock::new();
    HINT.get_or_init(|| {
        Regex::new(
            r#"(?ix)
            retry\s+in\s+(\d+(?:\.\d+)?)\s*s
            | retry\s+after\s+(\d+(?:\.\d+)?)\s*sec
            | retry_delay\s*[:{]\s*(?:seconds\s*:\s*)?(\d+(?:\.\d+)?)
            | "?retryDelay"?\s*:\s*"(\d+(?:\.\d+)?)s"
            "#,
        )
        .ok()
    })
    .as_ref()
}

/// Extract a provider-suggested delay from error text.
///
/// Recognises `retry in 17.5s`, `retry after 5 seconds`, `retry_delay: 8`,
/// `retry_delay { seconds: 8 }` and `"retryDelay": "8s"`.
pub fn parse_retry_hint(text: &str) -> Option<Duration> {
    let caps = hint_regex()?.captures(text)?;
    let secs: f64 = caps
        .iter()
        .skip(1)
        .flatten()
        .next()?
        .as_str()
        .parse()
        .ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| Duration::from_secs_f64(secs))
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    /// Upper bound for any single wait.
    pub max_delay: Duration,
    /// Timeout applied to each individual provider call.
    pub call_timeout: Duration,
    /// Add `0..1s` of random jitter to computed backoff.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_delay: Duration::from_secs(30),
            call_timeout: Duration::from_secs(60),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// `2^attempt` seconds (attempt counted from 0) plus optional jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = 2f64.powi(attempt.min(16) as i32);
        let jitter = if self.jitter {
            rand::thread_rng().gen_range(0.0..1.0)
        } else {
            0.0
        };
        Duration::from_secs_f64(base + jitter).min(self.max_delay)
    }

    /// Wait before retry number `attempt + 1`, preferring the provider hint.
    pub fn delay_for(&self, attempt: u32, error_text: &str) -> Duration {
        match parse_retry_hint(error_text) {
            Some(hint) => hint.min(self.max_delay),
            None => self.backoff(attempt),
        }
    }
}

/// A shared LLM handle with the retry policy applied to every call.
///
/// Cloning is cheap; the underlying client is shared read-only.
#[derive(Clone)]
pub struct RetryingLlm {
    client: Arc<dyn LlmClient + Send + Sync>,
    policy: RetryPolicy,
}

impl RetryingLlm {
    pub fn new(client: Arc<dyn LlmClient + Send + Sync>, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn system_prompt(&self) -> &str {
        self.client.default_factcheck_system_prompt()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// One logical generation: a single provider call, repeated only while
    /// the provider reports rate limiting and attempts remain.
    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: f32,
        max_tokens: u32,
        cancel: &CancellationToken,
    ) -> Result<LlmResponse> {
        let mut attempt = 0u32;
        loop {
            if cancel.is_cancelled() {
                return Err(TrustError::Cancelled);
            }

            let call = self
                .client
                .generate(prompt, system_prompt, Some(max_tokens), Some(temperature));
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(TrustError::Cancelled),
                r = tokio::time::timeout(self.policy.call_timeout, call) => r,
            };

            let err = match outcome {
                Ok(Ok(resp)) => {
                    if attempt > 0 {
                        tracing::info!(attempts = attempt + 1, model = %self.model_name(), "llm.retry.recovered");
                    }
                    return Ok(resp);
                }
                Ok(Err(e)) => e,
                Err(_) => TrustError::Timeout,
            };

            let text = err.to_string();
            match classify(&text) {
                ErrorClass::QuotaExhausted => {
                    tracing::warn!(message = %text, "llm.quota_exhausted");
                    return Err(TrustError::QuotaExhausted(text));
                }
                ErrorClass::Other => return Err(err),
                ErrorClass::RateLimited => {
                    attempt += 1;
                    if attempt >= self.policy.max_attempts {
                        tracing::warn!(attempts = attempt, message = %text, "llm.rate_limited.exhausted");
                        return Err(TrustError::RateLimited {
                            attempts: attempt,
                            message: text,
                        });
                    }
                    let delay = self.policy.delay_for(attempt - 1, &text);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        backoff_ms = delay.as_millis() as u64,
                        "llm.rate_limited.retrying"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(TrustError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_markers_are_case_insensitive() {
        assert_eq!(classify("HTTP 429 Too Many Requests"), ErrorClass::RateLimited);
        assert_eq!(classify("Rate Limit exceeded"), ErrorClass::RateLimited);
        assert_eq!(
            classify("RESOURCE_EXHAUSTED: Resource has been exhausted"),
            ErrorClass::RateLimited
        );
        assert_eq!(classify("connection reset by peer"), ErrorClass::Other);
    }

    #[test]
    fn quota_exhaustion_is_terminal() {
        assert_eq!(
            classify("insufficient_quota: You exceeded your current quota"),
            ErrorClass::QuotaExhausted
        );
        assert_eq!(
            classify("429 Quota exceeded for metric requests per day"),
            ErrorClass::QuotaExhausted
        );
        assert_eq!(
            classify("You exceeded your current quota, please check your plan and billing details"),
            ErrorClass::QuotaExhausted
        );
    }

    #[test]
    fn per_minute_quota_with_hint_is_retryable() {
        let text = "429 You exceeded your current quota, please check your plan and billing details. Please retry in 17.5s.";
        assert_eq!(classify(text), ErrorClass::RateLimited);
    }

    #[test]
    fn retry_hints_are_parsed_in_every_known_shape() {
        assert_eq!(parse_retry_hint("Please retry in 17.5s."), Some(Duration::from_millis(17_500)));
        assert_eq!(parse_retry_hint("retry after 5 seconds"), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_hint("Retry After 1 second"), Some(Duration::from_secs(1)));
        assert_eq!(parse_retry_hint("(retry_delay: 8)"), Some(Duration::from_secs(8)));
        assert_eq!(
            parse_retry_hint("retry_delay {\n  seconds: 12\n}"),
            Some(Duration::from_secs(12))
        );
        assert_eq!(parse_retry_hint(r#"{"retryDelay": "4s"}"#), Some(Duration::from_secs(4)));
        assert_eq!(parse_retry_hint("try again later"), None);
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        let policy = RetryPolicy {
            jitter: false,
            max_delay: Duration::from_secs(5),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(5));
    }

    #[test]
    fn jitter_stays_within_one_second() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let d = policy.backoff(1);
            assert!(d >= Duration::from_secs(2) && d < Duration::from_secs(3));
        }
    }

    #[test]
    fn provider_hint_beats_backoff_but_respects_cap() {
        let policy = RetryPolicy {
            jitter: false,
            max_delay: Duration::from_secs(10),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(0, "retry in 3s"), Duration::from_secs(3));
        assert_eq!(policy.delay_for(0, "retry in 300s"), Duration::from_secs(10));
        assert_eq!(policy.delay_for(2, "429"), Duration::from_secs(4));
    }
}
