use crate::model::{CredibilityTier, EvidenceSource, VerificationResult, VerificationStatus};
use std::collections::HashSet;

const VERACITY_WEIGHT: f64 = 0.40;
const AUTHORITY_WEIGHT: f64 = 0.25;
const AGREEMENT_WEIGHT: f64 = 0.20;
const VOLUME_WEIGHT: f64 = 0.15;

const VERIFICATION_SHARE: f64 = 0.50;
const AUTHENTICITY_SHARE: f64 = 0.25;
const NON_MANIPULATION_SHARE: f64 = 0.25;

const NEUTRAL: f64 = 50.0;

/// The four verification layers, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CredibilityLayers {
    pub veracity: f64,
    pub authority: f64,
    pub agreement: f64,
    pub volume: f64,
}

impl CredibilityLayers {
    pub fn weighted(&self) -> f64 {
        self.veracity * VERACITY_WEIGHT
            + self.authority * AUTHORITY_WEIGHT
            + self.agreement * AGREEMENT_WEIGHT
            + self.volume * VOLUME_WEIGHT
    }
}

fn status_weight(status: VerificationStatus) -> f64 {
    match status {
        VerificationStatus::Verified => 1.0,
        VerificationStatus::Uncertain => 0.2,
        VerificationStatus::Disputed => -1.0,
    }
}

fn is_unnamed(source: &EvidenceSource) -> bool {
    let name = source.name.trim();
    name.is_empty() || name.eq_ignore_ascii_case("unknown source")
}

fn authority_weight(source: &EvidenceSource) -> f64 {
    if is_unnamed(source) {
        return 0.2;
    }
    match source.credibility_tier {
        CredibilityTier::High => 1.0,
        CredibilityTier::Medium => 0.6,
        CredibilityTier::Low => 0.3,
    }
}

pub fn layers(results: &[VerificationResult]) -> CredibilityLayers {
    if results.is_empty() {
        return CredibilityLayers {
            veracity: NEUTRAL,
            authority: NEUTRAL,
            agreement: 0.0,
            volume: 0.0,
        };
    }
    let claims = results.len() as f64;

    let mean_status = results.iter().map(|r| status_weight(r.status)).sum::<f64>() / claims;
    let veracity = (mean_status + 1.0) / 2.0 * 100.0;

    let cited: Vec<&EvidenceSource> = results.iter().flat_map(|r| &r.sources).collect();
    let authority = if cited.is_empty() {
        NEUTRAL
    } else {
        cited.iter().map(|s| authority_weight(s)).sum::<f64>() / cited.len() as f64 * 100.0
    };

    let distinct: HashSet<String> = cited
        .iter()
        .filter(|s| !is_unnamed(s))
        .map(|s| s.name.trim().to_lowercase())
        .collect();
    let agreement = (distinct.len() as f64 / claims * 100.0).min(100.0);
    let volume = (claims * 12.0).min(100.0);

    CredibilityLayers {
        veracity,
        authority,
        agreement,
        volume,
    }
}

/// Final credibility: verification layers blended with the authenticity and
/// non-manipulation signals, then derated by the source-domain penalty.
pub fn credibility_score(
    results: &[VerificationResult],
    ai_likelihood: f64,
    manipulation_risk: f64,
    penalty: f64,
) -> f64 {
    let verification = layers(results).weighted();
    let blended = verification * VERIFICATION_SHARE
        + (100.0 - ai_likelihood.clamp(0.0, 100.0)) * AUTHENTICITY_SHARE
        + (100.0 - manipulation_risk.clamp(0.0, 100.0)) * NON_MANIPULATION_SHARE;
    (blended * penalty.clamp(0.0, 1.0)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(name: &str, tier: CredibilityTier) -> EvidenceSource {
        EvidenceSource {
            name: name.into(),
            headline: String::new(),
            url: String::new(),
            snippet: String::new(),
            published_at: String::new(),
            credibility_tier: tier,
        }
    }

    fn result(status: VerificationStatus, sources: Vec<EvidenceSource>) -> VerificationResult {
        VerificationResult::new("claim", status, "r", sources)
    }

    #[test]
    fn empty_results_are_neutral() {
        let l = layers(&[]);
        assert_eq!(l, CredibilityLayers { veracity: 50.0, authority: 50.0, agreement: 0.0, volume: 0.0 });
        assert!((l.weighted() - 32.5).abs() < 1e-9);
    }

    #[test]
    fn layer_arithmetic() {
        let results = vec![
            result(
                VerificationStatus::Verified,
                vec![src("Reuters", CredibilityTier::High), src("New York Times", CredibilityTier::Medium)],
            ),
            result(VerificationStatus::Disputed, vec![src("Unknown Source", CredibilityTier::Low)]),
        ];
        let l = layers(&results);
        assert!((l.veracity - 50.0).abs() < 1e-9);
        // (1.0 + 0.6 + 0.2) / 3
        assert!((l.authority - 60.0).abs() < 1e-9);
        assert!((l.agreement - 100.0).abs() < 1e-9);
        assert!((l.volume - 24.0).abs() < 1e-9);
    }

    #[test]
    fn integration_and_penalty() {
        let results = vec![result(VerificationStatus::Verified, vec![src("Reuters", CredibilityTier::High)])];
        // layers: 100, 100, 100, 12 -> 40 + 25 + 20 + 1.8 = 86.8
        let full = credibility_score(&results, 20.0, 10.0, 1.0);
        assert!((full - (86.8 * 0.5 + 80.0 * 0.25 + 90.0 * 0.25)).abs() < 1e-9);
        let derated = credibility_score(&results, 20.0, 10.0, 0.25);
        assert!((derated - full * 0.25).abs() < 1e-9);
    }

    #[test]
    fn score_stays_in_range_for_extreme_inputs() {
        for (ai, manip, pen) in [(-50.0, -50.0, 5.0), (500.0, 500.0, -1.0), (0.0, 0.0, 1.0)] {
            let s = credibility_score(&[], ai, manip, pen);
            assert!((0.0..=100.0).contains(&s), "{s}");
        }
    }
}
