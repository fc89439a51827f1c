//! Stylometric estimate of machine authorship.

use crate::text::{lower_tokens, split_sentences, tokens};
use std::collections::{HashMap, HashSet};

const MIN_SENTENCE_WORDS: usize = 4;
const NO_SIGNAL_SCORE: f64 = 40.0;
const REFERENCE_SENTENCE_WORDS: f64 = 18.0;

const VARIANCE_WEIGHT: f64 = 0.40;
const LEXICAL_WEIGHT: f64 = 0.20;
const REPETITION_WEIGHT: f64 = 0.20;
const UNIFORMITY_WEIGHT: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiSignals {
    pub variance: f64,
    pub lexical: f64,
    pub repetition: f64,
    pub uniformity: f64,
}

impl AiSignals {
    pub fn weighted(&self) -> f64 {
        self.variance * VARIANCE_WEIGHT
            + self.lexical * LEXICAL_WEIGHT
            + self.repetition * REPETITION_WEIGHT
            + self.uniformity * UNIFORMITY_WEIGHT
    }
}

/// `None` when no sentence has at least four words. Shorter sentences are
/// dropped before any signal is computed.
pub fn signals(content: &str) -> Option<AiSignals> {
    let kept: Vec<&str> = split_sentences(content)
        .into_iter()
        .filter(|s| tokens(s).count() >= MIN_SENTENCE_WORDS)
        .collect();
    if kept.is_empty() {
        return None;
    }
    let lengths: Vec<f64> = kept.iter().map(|s| tokens(s).count() as f64).collect();

    let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
    let var = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lengths.len() as f64;

    let words: Vec<String> = kept.iter().flat_map(|s| lower_tokens(s)).collect();
    let lexical = if words.is_empty() {
        0.0
    } else {
        let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
        (1.0 - unique.len() as f64 / words.len() as f64) * 100.0
    };

    let mut trigrams: HashMap<(&str, &str, &str), usize> = HashMap::new();
    for w in words.windows(3) {
        *trigrams.entry((&w[0], &w[1], &w[2])).or_default() += 1;
    }
    let repeated = trigrams.values().filter(|&&c| c > 2).count();

    Some(AiSignals {
        variance: 100.0 - var.min(100.0),
        lexical,
        repetition: (repeated as f64 * 10.0).min(100.0),
        uniformity: (100.0 - 5.0 * (mean - REFERENCE_SENTENCE_WORDS).abs()).max(0.0),
    })
}

pub fn ai_likelihood(content: &str) -> f64 {
    match signals(content) {
        Some(s) => s.weighted().clamp(0.0, 100.0),
        None => NO_SIGNAL_SCORE,
    }
}
