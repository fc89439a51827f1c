//! Zero-call claim verdicts from keyword and negation overlap.

use crate::model::{CredibilityTier, EvidenceSource, VerificationStatus};
use crate::text::{contains_word, keywords};

const NEGATION_MARKERS: [&str; 7] = [
    "not",
    "no",
    "denies",
    "false",
    "disputed",
    "incorrect",
    "wrong",
];

/// Share of claim keywords a source must contain to count as matching.
const MATCH_THRESHOLD: f64 = 0.5;
/// Weighted supporting count needed to verify a claim without the model.
const DECISIVE_WEIGHT: u32 = 2;
/// Contradicting sources needed to dispute a claim. Tier does not count here.
const DISPUTE_MIN_SOURCES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// The verdict is final.
    High,
    /// The claim should be escalated to the batch classifier.
    Low,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheapVerdict {
    pub status: VerificationStatus,
    pub rationale: String,
    pub confidence: Confidence,
}

impl CheapVerdict {
    fn new(status: VerificationStatus, rationale: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            status,
            rationale: rationale.into(),
            confidence,
        }
    }

    pub fn needs_escalation(&self) -> bool {
        self.confidence == Confidence::Low
    }
}

/// Support weight. A single wire-service source is decisive on its own.
fn support_weight(source: &EvidenceSource) -> u32 {
    match source.credibility_tier {
        CredibilityTier::High => 2,
        CredibilityTier::Medium | CredibilityTier::Low => 1,
    }
}

fn has_negation(text: &str) -> bool {
    NEGATION_MARKERS.iter().any(|m| contains_word(text, m))
}

fn name_list(names: &[&str]) -> String {
    names.join(", ")
}

/// Keyword-overlap classifier. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheapClassifier;

impl CheapClassifier {
    pub fn classify(&self, claim: &str, sources: &[EvidenceSource]) -> CheapVerdict {
        if sources.is_empty() {
            return CheapVerdict::new(
                VerificationStatus::Uncertain,
                "No evidence sources were found for this claim",
                Confidence::High,
            );
        }

        let claim_keywords = keywords(claim, 3);
        if claim_keywords.is_empty() {
            return CheapVerdict::new(
                VerificationStatus::Uncertain,
                "Claim has no distinctive keywords to match against evidence",
                Confidence::Low,
            );
        }

        let mut support = 0u32;
        let mut supporting: Vec<&str> = Vec::new();
        let mut contradicting: Vec<&str> = Vec::new();

        for source in sources {
            let text = format!("{} {}", source.headline, source.snippet).to_lowercase();
            let matched = claim_keywords.iter().filter(|k| text.contains(k.as_str())).count();
            let ratio = matched as f64 / claim_keywords.len() as f64;
            if ratio < MATCH_THRESHOLD {
                continue;
            }
            if has_negation(&text) {
                contradicting.push(&source.name);
            } else {
                support += support_weight(source);
                supporting.push(&source.name);
            }
        }

        tracing::debug!(
            support,
            contradicting = contradicting.len(),
            sources = sources.len(),
            "cheap.tally"
        );

        if support >= DECISIVE_WEIGHT && contradicting.is_empty() {
            CheapVerdict::new(
                VerificationStatus::Verified,
                format!("Corroborated by matching coverage from {}", name_list(&supporting)),
                Confidence::High,
            )
        } else if contradicting.len() >= DISPUTE_MIN_SOURCES {
            CheapVerdict::new(
                VerificationStatus::Disputed,
                format!("Contradicted by coverage from {}", name_list(&contradicting)),
                Confidence::High,
            )
        } else {
            CheapVerdict::new(
                VerificationStatus::Uncertain,
                format!(
                    "Keyword evidence inconclusive ({} supporting, {} contradicting)",
                    supporting.len(),
                    contradicting.len()
                ),
                Confidence::Low,
            )
        }
    }
}
