use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Query parameters for NewsAPI `/v2/everything`.
#[derive(Debug, Clone, Serialize)]
pub struct EverythingRequest<'a> {
    /// Query string
    pub q: &'a str,

    /// Results per page (NewsAPI caps this at 100)
    #[serde(rename = "pageSize")]
    pub page_size: u32,

    /// ISO 639-1 language code
    pub language: &'a str,

    /// `relevancy`, `popularity` or `publishedAt`
    #[serde(rename = "sortBy")]
    pub sort_by: &'static str,
}

impl<'a> EverythingRequest<'a> {
    pub fn to_query(&self) -> Vec<(&'static str, Cow<'a, str>)> {
        vec![
            ("q", Cow::Borrowed(self.q)),
            ("pageSize", Cow::Owned(self.page_size.to_string())),
            ("language", Cow::Borrowed(self.language)),
            ("sortBy", Cow::Borrowed(self.sort_by)),
        ]
    }
}

// Wire shapes. NewsAPI sends `null` for many article fields, so every field
// is optional and normalisation happens in `NewsArticle::from`.
#[derive(Debug, Deserialize)]
pub struct EverythingResponse {
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// A normalised search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub source_name: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub published_at: String,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

impl From<RawArticle> for NewsArticle {
    fn from(raw: RawArticle) -> Self {
        let source_name = non_blank(raw.source.and_then(|s| s.name))
            .unwrap_or_else(|| "Unknown Source".to_string());
        Self {
            source_name,
            title: non_blank(raw.title).unwrap_or_else(|| "Untitled".to_string()),
            url: raw.url.unwrap_or_default(),
            description: non_blank(raw.description)
                .or_else(|| non_blank(raw.content))
                .unwrap_or_default(),
            published_at: raw.published_at.unwrap_or_default(),
        }
    }
}
