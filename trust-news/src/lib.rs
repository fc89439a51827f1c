//! Evidence discovery for claim verification.
//!
//! - NewsAPI `everything` client (`newsapi`)
//! - The [`EvidenceSearch`] seam the pipeline depends on, returning an
//!   explicit [`SearchOutcome`] instead of an error the caller has to catch

pub mod newsapi;

use async_trait::async_trait;
pub use newsapi::{NewsApiClient, NewsApiSettings, NewsArticle};

/// Result of one search query.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// At least one article matched.
    Found(Vec<NewsArticle>),
    /// The provider answered but nothing matched.
    Empty,
    /// The provider could not be reached or rejected the query.
    Failed(String),
}

impl SearchOutcome {
    pub fn from_articles(articles: Vec<NewsArticle>) -> Self {
        if articles.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Found(articles)
        }
    }

    pub fn articles(&self) -> &[NewsArticle] {
        match self {
            SearchOutcome::Found(a) => a,
            _ => &[],
        }
    }
}

/// An article search provider.
///
/// Implementations never fail outright; provider trouble is reported as
/// [`SearchOutcome::Failed`] so callers can degrade without special casing.
#[async_trait]
pub trait EvidenceSearch: Send + Sync {
    async fn search(&self, query: &str) -> SearchOutcome;
}
