use crate::batch::{BatchClassifier, BatchItem, INCOMPLETE_RATIONALE};
use crate::cheap::CheapClassifier;
use crate::gatherer::EvidenceGatherer;
use crate::model::{Claim, VerificationResult, VerificationStatus};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

/// Lifecycle of one claim inside [`VerificationOrchestrator::verify_claims`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStage {
    Pending,
    Gathering,
    CheapCheck,
    QueuedForAi,
    Resolved,
}

fn advance(stages: &mut [ClaimStage], idx: usize, next: ClaimStage) {
    tracing::trace!(claim = idx, from = ?stages[idx], to = ?next, "orchestrator.stage");
    stages[idx] = next;
}

/// Gather → cheap check → one batch call for the leftovers.
///
/// Model calls per invocation are bounded by one, whatever the claim count.
pub struct VerificationOrchestrator {
    gatherer: EvidenceGatherer,
    cheap: CheapClassifier,
    batch: BatchClassifier,
    max_claims: usize,
    gather_concurrency: usize,
}

impl VerificationOrchestrator {
    pub fn new(
        gatherer: EvidenceGatherer,
        batch: BatchClassifier,
        max_claims: usize,
        gather_concurrency: usize,
    ) -> Self {
        Self {
            gatherer,
            cheap: CheapClassifier,
            batch,
            max_claims,
            gather_concurrency: gather_concurrency.max(1),
        }
    }

    /// One result per claim (after truncation to `max_claims`), in input order.
    pub async fn verify_claims(
        &self,
        claims: &[Claim],
        content: &str,
        page_url: &str,
        cancel: &CancellationToken,
    ) -> Vec<VerificationResult> {
        let claims = &claims[..claims.len().min(self.max_claims)];
        if claims.is_empty() {
            return Vec::new();
        }
        let mut stages = vec![ClaimStage::Pending; claims.len()];

        for idx in 0..claims.len() {
            advance(&mut stages, idx, ClaimStage::Gathering);
        }
        // `buffered` yields in input order regardless of completion order.
        let gathered: Vec<_> = stream::iter(claims)
            .map(|claim| self.gatherer.gather(claim, content, page_url))
            .buffered(self.gather_concurrency)
            .collect()
            .await;

        let mut slots: Vec<Option<VerificationResult>> = Vec::with_capacity(claims.len());
        let mut queued: Vec<usize> = Vec::new();
        let mut items: Vec<BatchItem> = Vec::new();

        for (idx, (claim, sources)) in claims.iter().zip(gathered).enumerate() {
            advance(&mut stages, idx, ClaimStage::CheapCheck);
            let verdict = self.cheap.classify(&claim.text, &sources);
            if verdict.needs_escalation() {
                advance(&mut stages, idx, ClaimStage::QueuedForAi);
                queued.push(idx);
                items.push(BatchItem {
                    claim: claim.text.clone(),
                    sources,
                });
                slots.push(None);
            } else {
                advance(&mut stages, idx, ClaimStage::Resolved);
                slots.push(Some(VerificationResult::new(
                    claim.text.clone(),
                    verdict.status,
                    verdict.rationale,
                    sources,
                )));
            }
        }

        tracing::info!(
            claims = claims.len(),
            resolved_cheaply = claims.len() - queued.len(),
            queued_for_ai = queued.len(),
            "orchestrator.cheap_pass"
        );

        if !items.is_empty() {
            let resolved = self.batch.classify_batch(&items, cancel).await;
            for (idx, result) in queued.into_iter().zip(resolved) {
                advance(&mut stages, idx, ClaimStage::Resolved);
                slots[idx] = Some(result);
            }
        }

        slots
            .into_iter()
            .zip(claims)
            .map(|(slot, claim)| {
                slot.unwrap_or_else(|| {
                    VerificationResult::new(
                        claim.text.clone(),
                        VerificationStatus::Uncertain,
                        INCOMPLETE_RATIONALE,
                        Vec::new(),
                    )
                })
            })
            .collect()
    }
}
