use crate::model::AnalysisResult;
use dashmap::DashMap;
use std::sync::Arc;

/// Hex blake3 digest of the page content; the cache key.
///
/// URL, title and images are not part of the key. Two pages with the same
/// text share one entry, including the first page's source penalty and
/// findings.
pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Previously computed analyses keyed by [`content_hash`].
///
/// The analyzer works the same with or without a cache; a hit skips the
/// pipeline entirely.
pub trait ResultCache: Send + Sync {
    fn get(&self, hash: &str) -> Option<AnalysisResult>;
    fn put(&self, hash: &str, result: &AnalysisResult);
}

/// Process-lifetime cache. Clones share the same map.
///
/// Entries are never evicted, so memory grows with the number of distinct
/// contents analyzed. Long-running hosts should supply their own
/// [`ResultCache`] with an eviction policy.
#[derive(Default, Clone)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, AnalysisResult>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, hash: &str) -> Option<AnalysisResult> {
        self.entries.get(hash).map(|e| e.value().clone())
    }

    fn put(&self, hash: &str, result: &AnalysisResult) {
        self.entries.insert(hash.to_string(), result.clone());
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl ResultCache for NoCache {
    fn get(&self, _hash: &str) -> Option<AnalysisResult> {
        None
    }

    fn put(&self, _hash: &str, _result: &AnalysisResult) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: f64) -> AnalysisResult {
        AnalysisResult {
            ai_generation_likelihood: 0.0,
            credibility_score: score,
            manipulation_risk: 0.0,
            claim_breakdown: vec![],
            findings: vec![],
            sources: vec![],
            report: String::new(),
        }
    }

    #[test]
    fn hash_is_stable_and_content_sensitive() {
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
        assert_eq!(content_hash("").len(), 64);
    }

    #[test]
    fn memory_cache_is_shared_between_clones() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        cache.put("k", &result(42.0));
        assert_eq!(other.get("k").map(|r| r.credibility_score), Some(42.0));
        assert_eq!(other.len(), 1);
        assert!(NoCache.get("k").is_none());
    }
}
