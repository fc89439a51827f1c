use super::types::{EverythingRequest, EverythingResponse, NewsArticle};
use crate::{EvidenceSearch, SearchOutcome};
use async_trait::async_trait;
use std::borrow::Cow;
use std::time::Duration;
use trust_common::{Result, TrustError};
use trust_http::{Auth, HttpClient, RequestOpts};

pub const NEWSAPI_EVERYTHING: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Clone)]
pub struct NewsApiSettings {
    pub api_key: String,
    pub endpoint: String,
    pub page_size: u32,
    pub language: String,
    pub timeout: Duration,
}

impl Default for NewsApiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: NEWSAPI_EVERYTHING.to_string(),
            page_size: 5,
            language: "en".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Minimal client for the NewsAPI `everything` endpoint.
///
/// Holds no mutable state; share it behind an `Arc` across requests.
#[derive(Clone)]
pub struct NewsApiClient {
    http: HttpClient,
    settings: NewsApiSettings,
}

impl NewsApiClient {
    pub fn new(settings: NewsApiSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(TrustError::Config("NewsAPI key is empty".to_string()));
        }
        let http = HttpClient::new(&settings.endpoint)
            .map_err(|e| TrustError::Config(format!("invalid NewsAPI endpoint: {e}")))?
            .with_timeout(settings.timeout);
        Ok(Self { http, settings })
    }

    /// Run one query, surfacing provider failures as [`TrustError::Search`].
    pub async fn search_articles(&self, query: &str) -> Result<Vec<NewsArticle>> {
        let req = EverythingRequest {
            q: query,
            page_size: self.settings.page_size,
            language: &self.settings.language,
            sort_by: "relevancy",
        };
        let opts = RequestOpts {
            auth: Some(Auth::Query {
                name: "apiKey",
                value: Cow::Borrowed(self.settings.api_key.as_str()),
            }),
            query: Some(req.to_query()),
            ..Default::default()
        };

        let resp: EverythingResponse = self
            .http
            .get_json("", opts)
            .await
            .map_err(|e| TrustError::Search(format!("NewsAPI request failed: {e}")))?;

        if resp.status != "ok" {
            let code = resp.code.as_deref().unwrap_or("error");
            let message = resp.message.as_deref().unwrap_or("Unknown error");
            return Err(TrustError::Search(format!("NewsAPI error: {code}: {message}")));
        }

        let articles: Vec<NewsArticle> = resp.articles.into_iter().map(NewsArticle::from).collect();
        tracing::info!(
            target: "news.newsapi",
            query = %query,
            hit_count = articles.len(),
            "newsapi.search"
        );
        Ok(articles)
    }
}

#[async_trait]
impl EvidenceSearch for NewsApiClient {
    async fn search(&self, query: &str) -> SearchOutcome {
        match self.search_articles(query).await {
            Ok(articles) => SearchOutcome::from_articles(articles),
            Err(e) => {
                tracing::warn!(target: "news.newsapi", query = %query, error = %e, "newsapi.search.failed");
                SearchOutcome::Failed(e.to_string())
            }
        }
    }
}
