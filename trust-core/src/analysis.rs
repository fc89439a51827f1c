//! End-to-end analysis of one page.

use crate::batch::BatchClassifier;
use crate::cache::{content_hash, ResultCache};
use crate::extractor::ClaimExtractor;
use crate::findings::findings;
use crate::gatherer::EvidenceGatherer;
use crate::model::{AnalysisRequest, AnalysisResult, EvidenceSource, VerificationResult};
use crate::orchestrator::VerificationOrchestrator;
use crate::scoring::ScoringEngine;
use crate::summarizer::Summarizer;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use trust_common::{Result, TrustError};
use trust_config::PipelineSettings;
use trust_llm::retry::RetryingLlm;
use trust_news::EvidenceSearch;

#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub max_claims: usize,
    pub min_content_chars: usize,
    pub gather_concurrency: usize,
    /// Budget for the whole pipeline, retries included.
    pub request_timeout: Duration,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self::from(&PipelineSettings::default())
    }
}

impl From<&PipelineSettings> for AnalyzerOptions {
    fn from(s: &PipelineSettings) -> Self {
        Self {
            max_claims: s.max_claims,
            min_content_chars: s.min_content_chars,
            gather_concurrency: s.gather_concurrency,
            request_timeout: Duration::from_secs(s.request_timeout_secs),
        }
    }
}

/// Runs extraction, verification, scoring and summarization for a request.
///
/// Holds only shared, read-only handles; one instance serves concurrent
/// requests.
pub struct Analyzer {
    extractor: ClaimExtractor,
    orchestrator: VerificationOrchestrator,
    scoring: ScoringEngine,
    summarizer: Summarizer,
    cache: Arc<dyn ResultCache>,
    options: AnalyzerOptions,
}

impl Analyzer {
    /// `llm = None` runs every model-backed stage on its deterministic fallback.
    pub fn new(
        llm: Option<RetryingLlm>,
        search: Arc<dyn EvidenceSearch>,
        scoring: ScoringEngine,
        cache: Arc<dyn ResultCache>,
        options: AnalyzerOptions,
    ) -> Self {
        let orchestrator = VerificationOrchestrator::new(
            EvidenceGatherer::new(search),
            BatchClassifier::new(llm.clone()),
            options.max_claims,
            options.gather_concurrency,
        );
        Self {
            extractor: ClaimExtractor::new(llm.clone()),
            orchestrator,
            scoring,
            summarizer: Summarizer::new(llm),
            cache,
            options,
        }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        self.analyze_with(request, &CancellationToken::new()).await
    }

    /// Like [`Analyzer::analyze`], also stopping when `parent` is cancelled.
    ///
    /// Errors are limited to validation, timeout and cancellation; provider
    /// failures inside the pipeline only degrade the result.
    pub async fn analyze_with(
        &self,
        request: &AnalysisRequest,
        parent: &CancellationToken,
    ) -> Result<AnalysisResult> {
        let content = request.content.trim();
        let chars = content.chars().count();
        if chars < self.options.min_content_chars {
            return Err(TrustError::Validation(format!(
                "content must be at least {} characters (got {chars})",
                self.options.min_content_chars
            )));
        }

        let hash = content_hash(content);
        if let Some(hit) = self.cache.get(&hash) {
            tracing::info!(hash = %&hash[..12], "analysis.cache_hit");
            return Ok(hit);
        }

        let started = Instant::now();
        let cancel = parent.child_token();
        let result = match tokio::time::timeout(
            self.options.request_timeout,
            self.run(request, content, &cancel),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                cancel.cancel();
                tracing::warn!(
                    timeout_secs = self.options.request_timeout.as_secs(),
                    "analysis.timeout"
                );
                return Err(TrustError::Timeout);
            }
        };
        // A cancelled run may have degraded silently; never cache or return it.
        if cancel.is_cancelled() {
            return Err(TrustError::Cancelled);
        }

        tracing::info!(
            claims = result.claim_breakdown.len(),
            credibility = result.credibility_score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis.done"
        );
        self.cache.put(&hash, &result);
        Ok(result)
    }

    async fn run(
        &self,
        request: &AnalysisRequest,
        content: &str,
        cancel: &CancellationToken,
    ) -> AnalysisResult {
        let claims = self
            .extractor
            .extract(content, self.options.max_claims, cancel)
            .await;
        tracing::info!(claims = claims.len(), url = %request.url, "analysis.extracted");

        let results = self
            .orchestrator
            .verify_claims(&claims, content, &request.url, cancel)
            .await;
        let scores = self.scoring.score(content, &results, &request.url);
        let report = self
            .summarizer
            .summarize(content, &claims, &results, cancel)
            .await;
        let image_count = request.images.as_ref().map_or(0, Vec::len);

        AnalysisResult {
            ai_generation_likelihood: round1(scores.ai_likelihood),
            credibility_score: round1(scores.credibility),
            manipulation_risk: round1(scores.manipulation_risk),
            findings: findings(&scores, &results, image_count),
            sources: dedup_sources(&results),
            claim_breakdown: results,
            report,
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Every cited source once, by lowercase name and URL, first occurrence first.
pub fn dedup_sources(results: &[VerificationResult]) -> Vec<EvidenceSource> {
    let mut seen = HashSet::new();
    results
        .iter()
        .flat_map(|r| &r.sources)
        .filter(|s| seen.insert((s.name.to_lowercase(), s.url.to_lowercase())))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CredibilityTier, VerificationStatus};

    fn src(name: &str, url: &str) -> EvidenceSource {
        EvidenceSource {
            name: name.into(),
            headline: String::new(),
            url: url.into(),
            snippet: String::new(),
            published_at: String::new(),
            credibility_tier: CredibilityTier::Low,
        }
    }

    #[test]
    fn sources_dedup_case_insensitively_in_order() {
        let results = vec![
            VerificationResult::new(
                "a",
                VerificationStatus::Verified,
                "r",
                vec![src("Reuters", "https://reuters.com/1"), src("BBC", "https://bbc.com/1")],
            ),
            VerificationResult::new(
                "b",
                VerificationStatus::Uncertain,
                "r",
                vec![src("reuters", "https://Reuters.com/1"), src("Reuters", "https://reuters.com/2")],
            ),
        ];
        let names: Vec<_> = dedup_sources(&results).into_iter().map(|s| s.url).collect();
        assert_eq!(
            names,
            vec!["https://reuters.com/1", "https://bbc.com/1", "https://reuters.com/2"]
        );
    }

    #[test]
    fn rounding_is_one_decimal() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.66), 66.7);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn options_follow_pipeline_settings() {
        let o = AnalyzerOptions::default();
        assert_eq!(o.max_claims, 5);
        assert_eq!(o.min_content_chars, 50);
        assert_eq!(o.request_timeout, Duration::from_secs(120));
    }
}
