//! Credibility, AI-likelihood and manipulation scoring.

pub mod ai_likelihood;
pub mod credibility;
pub mod manipulation;
pub mod penalty;

pub use penalty::{PenaltyRule, PenaltyTable};

use crate::model::VerificationResult;

/// The three headline scores plus the penalty that was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub ai_likelihood: f64,
    pub credibility: f64,
    pub manipulation_risk: f64,
    pub source_penalty: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    penalties: PenaltyTable,
}

impl ScoringEngine {
    pub fn new(penalties: PenaltyTable) -> Self {
        Self { penalties }
    }

    pub fn penalties(&self) -> &PenaltyTable {
        &self.penalties
    }

    pub fn score(&self, content: &str, results: &[VerificationResult], page_url: &str) -> Scores {
        let ai = ai_likelihood::ai_likelihood(content);
        let manipulation = manipulation::manipulation_risk(content);
        let source_penalty = self.penalties.factor_for(page_url);
        let credibility = credibility::credibility_score(results, ai, manipulation, source_penalty);

        tracing::debug!(ai, manipulation, credibility, source_penalty, "scoring.done");
        Scores {
            ai_likelihood: ai,
            credibility,
            manipulation_risk: manipulation,
            source_penalty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VerificationStatus;

    #[test]
    fn penalty_flows_into_credibility() {
        let engine = ScoringEngine::default();
        let results = vec![VerificationResult::new("c", VerificationStatus::Verified, "r", vec![])];
        let content = "The council approved the budget on Tuesday after a long debate.";
        let news = engine.score(content, &results, "https://www.reuters.com/a");
        let forum = engine.score(content, &results, "https://reddit.com/r/a");
        assert_eq!(news.source_penalty, 1.0);
        assert_eq!(forum.source_penalty, 0.25);
        assert!((forum.credibility - news.credibility * 0.25).abs() < 1e-9);
    }

    #[test]
    fn all_scores_bounded_for_degenerate_content() {
        let engine = ScoringEngine::default();
        let shouting = "WOW ".repeat(500);
        for content in ["", "!!!???!!!", shouting.as_str(), "a. b. c."] {
            let s = engine.score(content, &[], "");
            for v in [s.ai_likelihood, s.credibility, s.manipulation_risk] {
                assert!((0.0..=100.0).contains(&v), "{content:?} -> {v}");
            }
        }
    }
}
