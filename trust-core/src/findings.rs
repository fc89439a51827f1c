//! Human-readable flags shown next to the scores.

use crate::model::VerificationResult;
use crate::scoring::Scores;
use crate::summarizer::StatusCounts;

const AI_PATTERN_THRESHOLD: f64 = 60.0;
const MANIPULATION_THRESHOLD: f64 = 50.0;

/// Always returns at least one entry.
pub fn findings(scores: &Scores, results: &[VerificationResult], image_count: usize) -> Vec<String> {
    let mut out = Vec::new();

    if scores.ai_likelihood >= AI_PATTERN_THRESHOLD {
        out.push(format!(
            "Writing patterns consistent with AI generation ({:.0}% likelihood)",
            scores.ai_likelihood
        ));
    }
    if scores.manipulation_risk >= MANIPULATION_THRESHOLD {
        out.push(format!(
            "Emotionally charged or opinion-heavy language detected (manipulation risk {:.0}%)",
            scores.manipulation_risk
        ));
    }

    let counts = StatusCounts::tally(results);
    if counts.total() == 0 {
        out.push("No verifiable factual claims were found in this content".to_string());
    } else {
        if counts.verified > 0 {
            out.push(format!("{} claim(s) verified by independent sources", counts.verified));
        }
        if counts.disputed > 0 {
            out.push(format!("{} claim(s) disputed by available evidence", counts.disputed));
        }
        if counts.uncertain > 0 {
            out.push(format!("{} claim(s) could not be confirmed", counts.uncertain));
        }
    }

    if scores.source_penalty < 1.0 {
        out.push(format!(
            "Published on a user-generated content platform (credibility reduced to {:.0}%)",
            scores.source_penalty * 100.0
        ));
    }
    if image_count > 0 {
        out.push(format!("{image_count} image(s) present; image authenticity was not checked"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VerificationStatus;

    fn scores(ai: f64, manip: f64, penalty: f64) -> Scores {
        Scores {
            ai_likelihood: ai,
            credibility: 50.0,
            manipulation_risk: manip,
            source_penalty: penalty,
        }
    }

    #[test]
    fn quiet_page_with_no_claims_still_reports_something() {
        let f = findings(&scores(10.0, 0.0, 1.0), &[], 0);
        assert_eq!(f, vec!["No verifiable factual claims were found in this content".to_string()]);
    }

    #[test]
    fn every_flag_fires() {
        let results = vec![
            VerificationResult::new("a", VerificationStatus::Verified, "r", vec![]),
            VerificationResult::new("b", VerificationStatus::Disputed, "r", vec![]),
            VerificationResult::new("c", VerificationStatus::Uncertain, "r", vec![]),
        ];
        let f = findings(&scores(75.0, 60.0, 0.25), &results, 2);
        assert_eq!(f.len(), 7);
        assert!(f[0].contains("75%"));
        assert!(f.iter().any(|s| s.contains("reduced to 25%")));
        assert!(f.iter().any(|s| s.starts_with("2 image(s)")));
    }
}
