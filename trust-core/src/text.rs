//! Small text utilities used by the heuristics.

use std::collections::HashSet;

/// Split text into sentences.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace or the end of
/// the text. The terminator is kept; surrounding whitespace is trimmed.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = match chars.peek() {
            None => true,
            Some((_, next)) => next.is_whitespace(),
        };
        if at_boundary {
            let end = i + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

/// Alphanumeric tokens, original case.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// Lowercased alphanumeric tokens.
pub fn lower_tokens(text: &str) -> Vec<String> {
    tokens(text).map(str::to_lowercase).collect()
}

/// Whether `word` (lowercase) occurs as a whole token in `text`.
pub fn contains_word(text: &str, word: &str) -> bool {
    tokens(text).any(|t| t.eq_ignore_ascii_case(word))
}

/// Lowercase tokens longer than `min_len` characters, first occurrence order.
pub fn keywords(text: &str, min_len: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    lower_tokens(text)
        .into_iter()
        .filter(|t| t.chars().count() > min_len)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}
