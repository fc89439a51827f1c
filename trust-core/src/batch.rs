//! One model call resolving every claim the cheap classifier could not.

use crate::model::{EvidenceSource, VerificationResult, VerificationStatus, MAX_SOURCES_PER_RESULT};
use crate::text::truncate_chars;
use serde::Deserialize;
use std::fmt::Write as _;
use tokio_util::sync::CancellationToken;
use trust_llm::json::parse_json_array;
use trust_llm::retry::RetryingLlm;

const SNIPPET_PROMPT_CHARS: usize = 200;
const FAILURE_RATIONALE_CHARS: usize = 200;
const BATCH_TEMPERATURE: f32 = 0.1;
const BATCH_MAX_TOKENS: u32 = 2048;

pub const INCOMPLETE_RATIONALE: &str = "Verification incomplete";
pub const PARSE_FAILURE_RATIONALE: &str = "AI verification response could not be parsed";

/// A claim queued for model classification with the evidence found for it.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub claim: String,
    pub sources: Vec<EvidenceSource>,
}

// The echoed `claim` field is ignored; results are matched by position.
#[derive(Debug, Deserialize)]
struct WireVerdict {
    #[serde(default)]
    status: String,
    #[serde(default)]
    rationale: String,
}

pub struct BatchClassifier {
    llm: Option<RetryingLlm>,
}

impl BatchClassifier {
    pub fn new(llm: Option<RetryingLlm>) -> Self {
        Self { llm }
    }

    /// Same length and order as `items`. Never fails; makes at most one
    /// logical model call (retries of that call included).
    pub async fn classify_batch(
        &self,
        items: &[BatchItem],
        cancel: &CancellationToken,
    ) -> Vec<VerificationResult> {
        if items.is_empty() {
            return Vec::new();
        }
        let Some(llm) = &self.llm else {
            return degrade_all(items, "AI verification unavailable: no model configured");
        };

        let prompt = build_prompt(items);
        tracing::info!(claims = items.len(), model = %llm.model_name(), "batch.classify");

        let reply = match llm
            .generate(
                &prompt,
                Some(llm.system_prompt()),
                BATCH_TEMPERATURE,
                BATCH_MAX_TOKENS,
                cancel,
            )
            .await
        {
            Ok(resp) => resp.text,
            Err(e) => {
                tracing::warn!(error = %e, "batch.call_failed");
                let rationale = format!("AI verification unavailable: {e}");
                return degrade_all(items, truncate_chars(&rationale, FAILURE_RATIONALE_CHARS));
            }
        };

        let verdicts = match parse_json_array::<WireVerdict>(&reply) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "batch.parse_failed");
                return degrade_all(items, PARSE_FAILURE_RATIONALE);
            }
        };
        if verdicts.len() != items.len() {
            tracing::warn!(expected = items.len(), got = verdicts.len(), "batch.length_mismatch");
        }

        let mut verdicts = verdicts.into_iter();
        items
            .iter()
            .map(|item| match verdicts.next() {
                Some(v) => {
                    let rationale = if v.rationale.trim().is_empty() {
                        "No rationale provided".to_string()
                    } else {
                        v.rationale.trim().to_string()
                    };
                    VerificationResult::new(
                        &item.claim,
                        VerificationStatus::parse(&v.status),
                        rationale,
                        item.sources.clone(),
                    )
                    .with_model(llm.model_name())
                }
                None => VerificationResult::new(
                    &item.claim,
                    VerificationStatus::Uncertain,
                    INCOMPLETE_RATIONALE,
                    item.sources.clone(),
                ),
            })
            .collect()
    }
}

fn degrade_all(items: &[BatchItem], rationale: &str) -> Vec<VerificationResult> {
    items
        .iter()
        .map(|item| {
            VerificationResult::new(
                &item.claim,
                VerificationStatus::Uncertain,
                rationale,
                item.sources.clone(),
            )
        })
        .collect()
}

fn build_prompt(items: &[BatchItem]) -> String {
    let mut prompt = String::from(
        "Classify each claim below using ONLY the evidence listed with it.\n\
         Do not invent sources, articles or facts that are not listed.\n\
         status must be one of: verified, disputed, uncertain.\n\
         Use uncertain when the evidence is missing or insufficient.\n\n",
    );
    for (idx, item) in items.iter().enumerate() {
        let _ = writeln!(prompt, "Claim {}: \"{}\"", idx + 1, item.claim);
        if item.sources.is_empty() {
            prompt.push_str("Evidence: none found\n");
        } else {
            prompt.push_str("Evidence:\n");
            for s in item.sources.iter().take(MAX_SOURCES_PER_RESULT) {
                let _ = writeln!(
                    prompt,
                    "- {} | {} | {}",
                    s.name,
                    s.headline,
                    truncate_chars(&s.snippet, SNIPPET_PROMPT_CHARS)
                );
            }
        }
        prompt.push('\n');
    }
    let _ = write!(
        prompt,
        "Respond with only a JSON array of exactly {} objects, in the same order as the claims:\n\
         [{{\"claim\": \"...\", \"status\": \"verified|disputed|uncertain\", \"rationale\": \"one sentence\"}}]",
        items.len()
    );
    prompt
}
