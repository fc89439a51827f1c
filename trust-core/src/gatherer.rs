//! Evidence gathering: query construction, search, tiering and the
//! page-content fallback.

use crate::model::{Claim, CredibilityTier, EvidenceSource};
use crate::text::{keywords, split_sentences, tokens, truncate_chars};
use std::collections::HashSet;
use std::sync::Arc;
use trust_news::{EvidenceSearch, NewsArticle, SearchOutcome};
use url::Url;

const MAX_QUERY_VARIANTS: usize = 5;
const MAX_QUERIES_TRIED: usize = 3;
const MIN_QUERY_CHARS: usize = 6;
const SNIPPET_MAX_CHARS: usize = 500;
const SNIPPET_WINDOW_SENTENCES: usize = 3;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "he", "her",
    "his", "in", "is", "it", "its", "of", "on", "or", "she", "that", "the", "they", "this", "to",
    "was", "were", "will", "with", "about", "above", "according", "after", "again", "against",
    "almost", "along", "already", "although", "among", "another", "around", "because", "become",
    "before", "being", "below", "between", "could", "despite", "during", "either", "every",
    "first", "might", "never", "often", "other", "their", "there", "these", "those", "through",
    "throughout", "under", "until", "where", "whether", "which", "while", "would", "should",
    "since", "still", "today", "years", "later", "across", "within", "without",
];

const HIGH_TIER: &[&str] = &[
    "reuters",
    "associated press",
    "ap news",
    "afp",
    "agence france",
    "bbc",
    "npr",
    "pbs",
    "nature",
    "science",
    "lancet",
    "new england journal",
    "nejm",
    "jama",
];

const MEDIUM_TIER: &[&str] = &[
    "new york times",
    "washington post",
    "wall street journal",
    "guardian",
    "financial times",
    "economist",
    "bloomberg",
    "cnn",
    "cbs news",
    "nbc news",
    "abc news",
    "cnbc",
    "usa today",
    "los angeles times",
    "politico",
    "axios",
    "al jazeera",
    "the atlantic",
    "forbes",
];

fn is_stopword(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOPWORDS.contains(&lower.as_str())
}

/// Tier a source by case-insensitive substring match of its name.
pub fn credibility_tier(source_name: &str) -> CredibilityTier {
    let name = source_name.to_lowercase();
    if HIGH_TIER.iter().any(|k| name.contains(k)) {
        CredibilityTier::High
    } else if MEDIUM_TIER.iter().any(|k| name.contains(k)) {
        CredibilityTier::Medium
    } else {
        CredibilityTier::Low
    }
}

fn important_words(text: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    tokens(text)
        .filter(|w| w.chars().count() > 4 && !is_stopword(w))
        .filter(|w| seen.insert(w.to_lowercase()))
        .collect()
}

fn longest(words: &[&str], n: usize) -> String {
    let mut sorted = words.to_vec();
    sorted.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    sorted.into_iter().take(n).collect::<Vec<_>>().join(" ")
}

/// Topic hint from the page URL: a decoded Wikipedia title, otherwise up to
/// two important words from the last path segment.
pub fn url_topic(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if host.ends_with("wikipedia.org") {
        if let ["wiki", title, ..] = segments.as_slice() {
            let decoded = urlencoding::decode(title).ok()?;
            let topic = decoded.replace('_', " ").trim().to_string();
            return (!topic.is_empty()).then_some(topic);
        }
    }

    let slug = urlencoding::decode(segments.last()?).ok()?.into_owned();
    let words: Vec<&str> = important_words(&slug)
        .into_iter()
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .take(2)
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

/// Ranked search query variants for a claim.
pub fn build_queries(claim: &str, page_url: &str) -> Vec<String> {
    let claim = claim.trim().trim_end_matches(['.', '!', '?']).trim();
    let important = important_words(claim);
    let mut variants: Vec<String> = Vec::new();

    if claim.split_whitespace().count() >= 5 {
        variants.push(claim.to_string());
    }
    if let Some(topic) = url_topic(page_url) {
        variants.push(format!("{claim} {topic}"));
    }
    variants.push(longest(&important, 4));

    let capitalized: Vec<&str> = tokens(claim)
        .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
        .filter(|w| !is_stopword(w))
        .take(3)
        .collect();
    variants.push(capitalized.join(" "));
    variants.push(longest(&important, 2));

    let mut seen = HashSet::new();
    variants
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| v.chars().count() >= MIN_QUERY_CHARS)
        .filter(|v| seen.insert(v.to_lowercase()))
        .take(MAX_QUERY_VARIANTS)
        .collect()
}

fn to_source(article: NewsArticle) -> EvidenceSource {
    let credibility_tier = credibility_tier(&article.source_name);
    EvidenceSource {
        name: article.source_name,
        headline: article.title,
        url: article.url,
        snippet: article.description,
        published_at: article.published_at,
        credibility_tier,
    }
}

/// The three-sentence window sharing the most significant words with the
/// claim, or the start of the content when nothing overlaps.
pub fn best_snippet(claim: &str, content: &str) -> String {
    let significant: Vec<String> = keywords(claim, 3)
        .into_iter()
        .filter(|w| !is_stopword(w))
        .collect();
    let sentences = split_sentences(content);

    let mut best: Option<(usize, String)> = None;
    for start in 0..sentences.len() {
        let end = (start + SNIPPET_WINDOW_SENTENCES).min(sentences.len());
        let window = sentences[start..end].join(" ");
        let window_words: HashSet<String> = tokens(&window).map(str::to_lowercase).collect();
        let overlap = significant.iter().filter(|w| window_words.contains(*w)).count();
        if overlap > 0 && best.as_ref().map_or(true, |(score, _)| overlap > *score) {
            best = Some((overlap, window));
        }
    }

    match best {
        Some((_, window)) => truncate_chars(&window, SNIPPET_MAX_CHARS).to_string(),
        None => truncate_chars(content.trim(), SNIPPET_MAX_CHARS).to_string(),
    }
}

fn page_source(claim: &str, content: &str, page_url: &str) -> Option<EvidenceSource> {
    if content.trim().is_empty() {
        return None;
    }
    let name = if page_url.contains("wikipedia.org") {
        "Wikipedia Article"
    } else {
        "Page Content"
    };
    Some(EvidenceSource {
        name: name.to_string(),
        headline: "Context from the analyzed page".to_string(),
        url: page_url.to_string(),
        snippet: best_snippet(claim, content),
        published_at: String::new(),
        credibility_tier: credibility_tier(name),
    })
}

/// Looks up evidence for claims through an [`EvidenceSearch`] provider.
#[derive(Clone)]
pub struct EvidenceGatherer {
    search: Arc<dyn EvidenceSearch>,
}

impl EvidenceGatherer {
    pub fn new(search: Arc<dyn EvidenceSearch>) -> Self {
        Self { search }
    }

    /// Never fails; provider trouble degrades to the page-content source.
    pub async fn gather(&self, claim: &Claim, content: &str, page_url: &str) -> Vec<EvidenceSource> {
        let queries = build_queries(&claim.text, page_url);
        for query in queries.iter().take(MAX_QUERIES_TRIED) {
            match self.search.search(query).await {
                SearchOutcome::Found(articles) => {
                    tracing::debug!(query = %query, hits = articles.len(), "gatherer.found");
                    return articles.into_iter().map(to_source).collect();
                }
                SearchOutcome::Empty => {
                    tracing::debug!(query = %query, "gatherer.empty");
                }
                SearchOutcome::Failed(reason) => {
                    tracing::warn!(query = %query, reason = %reason, "gatherer.search_failed");
                }
            }
        }

        tracing::info!(claim = %claim.text, "gatherer.fallback_to_page_content");
        page_source(&claim.text, content, page_url)
            .into_iter()
            .collect()
    }
}
