//! Claim verification and credibility scoring pipeline.
//!
//! [`Analyzer`] drives the stages in order:
//!
//! 1. [`extractor::ClaimExtractor`] pulls checkable claims from the page
//! 2. [`orchestrator::VerificationOrchestrator`] gathers evidence, tries the
//!    keyword classifier and sends the rest to one batched model call
//! 3. [`scoring::ScoringEngine`] computes credibility, AI likelihood and
//!    manipulation risk
//! 4. [`summarizer::Summarizer`] writes the report
//!
//! Model calls per request are bounded by a constant regardless of how many
//! claims the page holds.

pub mod analysis;
pub mod batch;
pub mod cache;
pub mod cheap;
pub mod extractor;
pub mod findings;
pub mod gatherer;
pub mod model;
pub mod orchestrator;
pub mod scoring;
pub mod summarizer;
pub mod text;

pub use analysis::{Analyzer, AnalyzerOptions};
pub use cache::{MemoryCache, NoCache, ResultCache};
pub use model::{
    AnalysisRequest, AnalysisResult, Claim, CredibilityTier, EvidenceSource, VerificationResult,
    VerificationStatus,
};
pub use scoring::{PenaltyTable, ScoringEngine};
