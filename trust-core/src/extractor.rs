use crate::model::Claim;
use crate::text::{contains_word, split_sentences, truncate_chars};
use tokio_util::sync::CancellationToken;
use trust_llm::json::parse_json_array;
use trust_llm::retry::RetryingLlm;

const ATTRIBUTION_KEYWORDS: [&str; 12] = [
    "said",
    "reported",
    "claimed",
    "stated",
    "announced",
    "found",
    "discovered",
    "published",
    "released",
    "revealed",
    "confirmed",
    "estimated",
];

// Keeps the prompt well inside small-model context windows.
const MAX_PROMPT_CONTENT_CHARS: usize = 6000;

/// Pulls checkable factual statements out of page text.
pub struct ClaimExtractor {
    llm: Option<RetryingLlm>,
}

impl ClaimExtractor {
    /// `None` disables the model call and always uses the sentence heuristic.
    pub fn new(llm: Option<RetryingLlm>) -> Self {
        Self { llm }
    }

    /// At most `max_claims` claims. Never fails: any provider or parse
    /// problem falls back to [`ClaimExtractor::heuristic`].
    pub async fn extract(
        &self,
        content: &str,
        max_claims: usize,
        cancel: &CancellationToken,
    ) -> Vec<Claim> {
        if max_claims == 0 {
            return Vec::new();
        }
        let Some(llm) = &self.llm else {
            return Self::heuristic(content, max_claims);
        };

        let prompt = build_prompt(content, max_claims);
        let reply = match llm
            .generate(&prompt, Some(llm.system_prompt()), 0.2, 1024, cancel)
            .await
        {
            Ok(resp) => resp.text,
            Err(e) => {
                tracing::warn!(error = %e, "extractor.llm_failed; using heuristic");
                return Self::heuristic(content, max_claims);
            }
        };

        match parse_json_array::<String>(&reply) {
            Ok(items) => {
                let claims: Vec<Claim> = items
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .take(max_claims)
                    .map(Claim::new)
                    .collect();
                if claims.is_empty() {
                    tracing::info!("extractor.empty_reply; using heuristic");
                    return Self::heuristic(content, max_claims);
                }
                tracing::info!(count = claims.len(), "extractor.claims");
                claims
            }
            Err(e) => {
                tracing::warn!(error = %e, "extractor.parse_failed; using heuristic");
                Self::heuristic(content, max_claims)
            }
        }
    }

    /// Sentences carrying a number or an attribution verb, in page order.
    pub fn heuristic(content: &str, max_claims: usize) -> Vec<Claim> {
        split_sentences(content)
            .into_iter()
            .filter(|s| {
                s.chars().any(|c| c.is_ascii_digit())
                    || ATTRIBUTION_KEYWORDS.iter().any(|k| contains_word(s, k))
            })
            .take(max_claims)
            .map(Claim::new)
            .collect()
    }
}

fn build_prompt(content: &str, max_claims: usize) -> String {
    format!(
        "Extract exactly {max_claims} specific, verifiable factual claims from the text below.\n\
         Prefer statements with names, numbers, dates or attributed quotes. Skip opinions.\n\
         Respond with only a JSON array of strings, for example [\"claim one\", \"claim two\"].\n\n\
         Text:\n{}",
        truncate_chars(content, MAX_PROMPT_CONTENT_CHARS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_keeps_numeric_and_attributed_sentences() {
        let content = "The Eiffel Tower is 330 meters tall. Paris was founded in 259 BC.";
        let claims = ClaimExtractor::heuristic(content, 5);
        assert_eq!(
            claims,
            vec![
                Claim::new("The Eiffel Tower is 330 meters tall."),
                Claim::new("Paris was founded in 259 BC."),
            ]
        );
    }

    #[test]
    fn heuristic_skips_plain_opinion_and_caps_count() {
        let content = "I love this city. The mayor said the park will reopen. \
                       Officials confirmed the budget. Scientists found water. It was 5 km long.";
        let claims = ClaimExtractor::heuristic(content, 3);
        assert_eq!(claims.len(), 3);
        assert_eq!(claims[0].text, "The mayor said the park will reopen.");
    }

    #[test]
    fn prompt_names_the_requested_count() {
        let p = build_prompt("Some text", 4);
        assert!(p.contains("exactly 4"));
        assert!(p.contains("JSON array"));
    }

    #[tokio::test]
    async fn without_llm_the_heuristic_runs() {
        let extractor = ClaimExtractor::new(None);
        let claims = extractor
            .extract("Revenue grew 12% last year. Nice.", 5, &CancellationToken::new())
            .await;
        assert_eq!(claims, vec![Claim::new("Revenue grew 12% last year.")]);
    }
}
