use crate::model::{Claim, VerificationResult, VerificationStatus};
use crate::text::truncate_chars;
use std::fmt::Write as _;
use tokio_util::sync::CancellationToken;
use trust_llm::retry::RetryingLlm;

const SUMMARY_TEMPERATURE: f32 = 0.3;
const SUMMARY_MAX_TOKENS: u32 = 400;
const CONTEXT_CHARS: usize = 1500;

const HIGH_VERIFIED_RATIO: f64 = 0.7;
const LOW_DISPUTED_RATIO: f64 = 0.5;

pub const NO_CLAIMS_SUMMARY: &str = "No specific factual claims could be extracted from this content, \
     so its credibility could not be checked against independent sources.";
const RECOMMENDATION: &str = "Verify disputed claims independently before sharing.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub verified: usize,
    pub disputed: usize,
    pub uncertain: usize,
}

impl StatusCounts {
    pub fn tally(results: &[VerificationResult]) -> Self {
        let mut counts = Self::default();
        for r in results {
            match r.status {
                VerificationStatus::Verified => counts.verified += 1,
                VerificationStatus::Disputed => counts.disputed += 1,
                VerificationStatus::Uncertain => counts.uncertain += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.verified + self.disputed + self.uncertain
    }
}

/// Writes the narrative `report`.
pub struct Summarizer {
    llm: Option<RetryingLlm>,
}

impl Summarizer {
    pub fn new(llm: Option<RetryingLlm>) -> Self {
        Self { llm }
    }

    /// Never fails; a missing model, provider error or blank reply yields
    /// [`fallback_summary`].
    pub async fn summarize(
        &self,
        content: &str,
        claims: &[Claim],
        results: &[VerificationResult],
        cancel: &CancellationToken,
    ) -> String {
        if claims.is_empty() || results.is_empty() {
            return fallback_summary(results);
        }
        let Some(llm) = &self.llm else {
            return fallback_summary(results);
        };

        let prompt = build_prompt(content, results);
        match llm
            .generate(
                &prompt,
                Some(llm.system_prompt()),
                SUMMARY_TEMPERATURE,
                SUMMARY_MAX_TOKENS,
                cancel,
            )
            .await
        {
            Ok(resp) if !resp.text.trim().is_empty() => resp.text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("summarizer.empty_reply");
                fallback_summary(results)
            }
            Err(e) => {
                tracing::warn!(error = %e, "summarizer.llm_failed");
                fallback_summary(results)
            }
        }
    }
}

/// Deterministic report from the status counts alone.
pub fn fallback_summary(results: &[VerificationResult]) -> String {
    let counts = StatusCounts::tally(results);
    if counts.total() == 0 {
        return NO_CLAIMS_SUMMARY.to_string();
    }
    let total = counts.total() as f64;
    let label = if counts.verified as f64 / total >= HIGH_VERIFIED_RATIO {
        "HIGH"
    } else if counts.disputed as f64 / total >= LOW_DISPUTED_RATIO {
        "LOW"
    } else {
        "MIXED"
    };
    format!(
        "Overall credibility: {label}. Of {} claims checked, {} verified, {} disputed and {} uncertain. {RECOMMENDATION}",
        counts.total(),
        counts.verified,
        counts.disputed,
        counts.uncertain,
    )
}

fn build_prompt(content: &str, results: &[VerificationResult]) -> String {
    let counts = StatusCounts::tally(results);
    let mut prompt = format!(
        "Write a 2-4 sentence expert assessment of the credibility of the content below.\n\
         Base it ONLY on the verification evidence listed; do not add outside facts.\n\n\
         Verification counts: {} verified, {} disputed, {} uncertain.\n\nEvidence digest:\n",
        counts.verified, counts.disputed, counts.uncertain
    );
    for (idx, r) in results.iter().enumerate() {
        let _ = writeln!(
            prompt,
            "{}. \"{}\" | {} | {} | {} source(s)",
            idx + 1,
            r.claim,
            r.status.as_str(),
            r.rationale,
            r.sources.len()
        );
    }
    let _ = write!(
        prompt,
        "\nContent excerpt:\n{}\n\nAssessment:",
        truncate_chars(content, CONTEXT_CHARS)
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(statuses: &[VerificationStatus]) -> Vec<VerificationResult> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| VerificationResult::new(format!("claim {i}"), *s, "because", vec![]))
            .collect()
    }

    #[test]
    fn labels_follow_ratios() {
        use VerificationStatus::*;
        let high = fallback_summary(&results(&[Verified, Verified, Verified, Uncertain]));
        assert!(high.starts_with("Overall credibility: HIGH."));
        assert!(high.contains("3 verified, 0 disputed and 1 uncertain"));
        assert!(high.ends_with(RECOMMENDATION));

        let low = fallback_summary(&results(&[Disputed, Disputed, Verified, Uncertain]));
        assert!(low.starts_with("Overall credibility: LOW."));

        let mixed = fallback_summary(&results(&[Verified, Disputed, Uncertain]));
        assert!(mixed.starts_with("Overall credibility: MIXED."));
    }

    #[test]
    fn no_claims_has_its_own_message() {
        assert_eq!(fallback_summary(&[]), NO_CLAIMS_SUMMARY);
    }

    #[test]
    fn digest_lists_every_claim() {
        let r = results(&[VerificationStatus::Verified, VerificationStatus::Disputed]);
        let p = build_prompt("body", &r);
        assert!(p.contains("1. \"claim 0\" | verified | because | 0 source(s)"));
        assert!(p.contains("2. \"claim 1\" | disputed"));
        assert!(p.contains("1 verified, 1 disputed, 0 uncertain"));
    }

    #[tokio::test]
    async fn no_model_uses_fallback() {
        let s = Summarizer::new(None);
        let r = results(&[VerificationStatus::Verified]);
        let out = s
            .summarize("body", &[Claim::from("claim 0")], &r, &CancellationToken::new())
            .await;
        assert!(out.starts_with("Overall credibility: HIGH."));
    }
}
