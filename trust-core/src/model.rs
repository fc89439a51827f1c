//! Request, evidence and result types shared by the pipeline stages.
//!
//! Wire names are camelCase to match the browser extension's schema.

use serde::{Deserialize, Serialize};

/// Upper bound on evidence attached to a single verification result.
pub const MAX_SOURCES_PER_RESULT: usize = 3;

/// A single extracted, independently checkable statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claim {
    pub text: String,
}

impl Claim {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for Claim {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredibilityTier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceSource {
    pub name: String,
    pub headline: String,
    pub url: String,
    pub snippet: String,
    pub published_at: String,
    pub credibility_tier: CredibilityTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    Disputed,
    Uncertain,
}

impl VerificationStatus {
    /// Lenient label parsing; anything unrecognised is `Uncertain`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "verified" => VerificationStatus::Verified,
            "disputed" => VerificationStatus::Disputed,
            _ => VerificationStatus::Uncertain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "verified",
            VerificationStatus::Disputed => "disputed",
            VerificationStatus::Uncertain => "uncertain",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub claim: String,
    pub status: VerificationStatus,
    pub rationale: String,
    pub sources: Vec<EvidenceSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model_used: Option<String>,
}

impl VerificationResult {
    /// Build a result, keeping at most [`MAX_SOURCES_PER_RESULT`] sources.
    pub fn new(
        claim: impl Into<String>,
        status: VerificationStatus,
        rationale: impl Into<String>,
        mut sources: Vec<EvidenceSource>,
    ) -> Self {
        sources.truncate(MAX_SOURCES_PER_RESULT);
        Self {
            claim: claim.into(),
            status,
            rationale: rationale.into(),
            sources,
            ai_model_used: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.ai_model_used = Some(model.into());
        self
    }
}

/// Inbound analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
    pub content: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub ai_generation_likelihood: f64,
    pub credibility_score: f64,
    pub manipulation_risk: f64,
    pub claim_breakdown: Vec<VerificationResult>,
    pub findings: Vec<String>,
    pub sources: Vec<EvidenceSource>,
    pub report: String,
}
