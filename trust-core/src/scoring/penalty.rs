//! Source-domain credibility penalty.
//!
//! User-generated-content hosts are derated; their "published article"
//! sub-paths less so. Anything unmatched keeps the full score.
//!
//! Rules match as URL substrings by default. A rule only matches where its
//! domain starts a label, so `x.com` does not hit `dropbox.com`.

use trust_config::{PenaltyMatch, PenaltyRuleConfig};
use url::Url;

pub const NO_PENALTY: f64 = 1.0;
pub const UGC_PENALTY: f64 = 0.25;
pub const ARTICLE_PATH_PENALTY: f64 = 0.40;

const UGC_HOSTS: &[&str] = &[
    "reddit.com",
    "quora.com",
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "tiktok.com",
    "youtube.com",
    "pinterest.com",
    "tumblr.com",
    "linkedin.com",
    "medium.com",
    "substack.com",
    "blogspot.com",
    "wordpress.com",
    "4chan.org",
];

const ARTICLE_PATHS: &[(&str, &str)] = &[
    ("linkedin.com", "/pulse"),
    ("medium.com", "/p/"),
    ("substack.com", "/p/"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyRule {
    pub domain: String,
    pub path_prefix: Option<String>,
    pub factor: f64,
}

impl PenaltyRule {
    pub fn new(domain: &str, path_prefix: Option<&str>, factor: f64) -> Self {
        Self {
            domain: domain.trim().to_lowercase(),
            path_prefix: path_prefix.map(str::to_string),
            factor: factor.clamp(0.0, 1.0),
        }
    }

    fn specificity(&self) -> (bool, usize) {
        (self.path_prefix.is_some(), self.domain.len())
    }

    fn matches_url(&self, host: &str, path: &str) -> bool {
        let host_ok = host == self.domain || host.ends_with(&format!(".{}", self.domain));
        host_ok
            && self
                .path_prefix
                .as_deref()
                .map_or(true, |prefix| path.starts_with(prefix))
    }

    fn matches_text(&self, lower: &str) -> bool {
        let needle = match &self.path_prefix {
            Some(prefix) => format!("{}{}", self.domain, prefix),
            None => self.domain.clone(),
        };
        lower.match_indices(&needle).any(|(idx, _)| {
            lower[..idx]
                .chars()
                .next_back()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '-'))
        })
    }
}

/// Immutable lookup table shared across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyTable {
    rules: Vec<PenaltyRule>,
    mode: PenaltyMatch,
}

impl Default for PenaltyTable {
    fn default() -> Self {
        let mut rules: Vec<PenaltyRule> = UGC_HOSTS
            .iter()
            .map(|host| PenaltyRule::new(host, None, UGC_PENALTY))
            .collect();
        rules.extend(
            ARTICLE_PATHS
                .iter()
                .map(|&(host, path)| PenaltyRule::new(host, Some(path), ARTICLE_PATH_PENALTY)),
        );
        Self::new(rules)
    }
}

impl PenaltyTable {
    pub fn new(rules: Vec<PenaltyRule>) -> Self {
        Self {
            rules,
            mode: PenaltyMatch::default(),
        }
    }

    pub fn with_mode(mut self, mode: PenaltyMatch) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> PenaltyMatch {
        self.mode
    }

    pub fn from_config(rules: &[PenaltyRuleConfig]) -> Self {
        Self::new(
            rules
                .iter()
                .map(|r| PenaltyRule::new(&r.domain, r.path_prefix.as_deref(), r.factor))
                .collect(),
        )
    }

    pub fn rules(&self) -> &[PenaltyRule] {
        &self.rules
    }

    /// Multiplier in `[0, 1]` for a page URL; the most specific matching
    /// rule wins. Host mode falls back to substring matching for URLs that
    /// do not parse.
    pub fn factor_for(&self, page_url: &str) -> f64 {
        let parsed = match self.mode {
            PenaltyMatch::Substring => None,
            PenaltyMatch::Host => Url::parse(page_url.trim()).ok().and_then(|u| {
                let host = u.host_str()?.to_lowercase();
                Some((host, u.path().to_string()))
            }),
        };

        let lower = page_url.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| match &parsed {
                Some((host, path)) => rule.matches_url(host, path),
                None => rule.matches_text(&lower),
            })
            .max_by_key(|rule| rule.specificity())
            .map_or(NO_PENALTY, |rule| rule.factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ugc_and_news_hosts() {
        let table = PenaltyTable::default();
        assert_eq!(table.factor_for("https://www.reddit.com/r/science/comments/abc"), 0.25);
        assert_eq!(table.factor_for("https://www.reuters.com/world/article"), 1.0);
        assert_eq!(table.factor_for("https://www.quora.com/Best-way-to-learn"), 0.25);
    }

    #[test]
    fn article_subpaths_are_derated_less() {
        let table = PenaltyTable::default();
        assert_eq!(table.factor_for("https://www.linkedin.com/pulse/some-post"), 0.40);
        assert_eq!(table.factor_for("https://medium.com/p/abc123"), 0.40);
        assert_eq!(table.factor_for("https://writer.substack.com/p/essay"), 0.40);
        assert_eq!(table.factor_for("https://medium.com/@someone"), 0.25);
    }

    #[test]
    fn lookalike_hosts_do_not_match() {
        for table in [
            PenaltyTable::default(),
            PenaltyTable::default().with_mode(PenaltyMatch::Host),
        ] {
            assert_eq!(table.factor_for("https://notreddit.com.example.org/x"), 1.0);
            assert_eq!(table.factor_for("https://box.com/file"), 1.0);
            assert_eq!(table.factor_for("https://www.dropbox.com/s/abc"), 1.0);
        }
    }

    #[test]
    fn wrapped_urls_match_by_substring_only() {
        let wrapped = "https://www.google.com/url?q=https://reddit.com/r/news/comments/1";
        let substring = PenaltyTable::default();
        assert_eq!(substring.mode(), PenaltyMatch::Substring);
        assert_eq!(substring.factor_for(wrapped), 0.25);

        let host = PenaltyTable::default().with_mode(PenaltyMatch::Host);
        assert_eq!(host.factor_for(wrapped), 1.0);
        assert_eq!(host.factor_for("https://old.reddit.com/r/news"), 0.25);
        assert_eq!(host.factor_for("https://medium.com/p/abc123"), 0.40);
    }

    #[test]
    fn unparseable_urls_fall_back_to_substring() {
        let table = PenaltyTable::default().with_mode(PenaltyMatch::Host);
        assert_eq!(table.factor_for("reddit.com/r/news"), 0.25);
        assert_eq!(table.factor_for(""), 1.0);
    }

    #[test]
    fn configured_rules_replace_defaults() {
        let table = PenaltyTable::from_config(&[PenaltyRuleConfig {
            domain: "example.org".into(),
            path_prefix: None,
            factor: 1.7,
        }]);
        assert_eq!(table.factor_for("https://blog.example.org/a"), 1.0);
        assert_eq!(table.factor_for("https://reddit.com/r/a"), 1.0);
        assert_eq!(table.rules()[0].factor, 1.0);
    }
}
