//! Rhetorical-pressure score: loaded language, certainty, conspiracy framing,
//! first-person opinion, speculation and shouting.

use crate::text::{lower_tokens, tokens};

const EMOTIONAL: &[&str] = &[
    "shocking",
    "outrageous",
    "horrifying",
    "terrifying",
    "devastating",
    "disgusting",
    "unbelievable",
    "insane",
    "explosive",
    "bombshell",
    "furious",
    "disaster",
    "catastrophic",
    "scandal",
    "evil",
    "destroy",
    "destroyed",
    "slams",
    "heartbreaking",
    "panic",
];

const CERTAINTY: &[&str] = &[
    "definitely",
    "certainly",
    "undeniably",
    "undeniable",
    "absolutely",
    "always",
    "never",
    "proven",
    "guaranteed",
    "everyone knows",
    "without a doubt",
    "no doubt",
    "100 percent",
];

const CONSPIRACY: &[&str] = &[
    "wake up",
    "deep state",
    "cover up",
    "they don't want you to know",
    "mainstream media won't",
    "what they are hiding",
    "new world order",
    "false flag",
    "sheeple",
    "do your own research",
];

const OPINION: &[&str] = &[
    "i think",
    "i believe",
    "i feel",
    "in my opinion",
    "in my view",
    "personally",
    "i'm sure",
    "i am sure",
    "if you ask me",
    "my take",
];

const SPECULATION: &[&str] = &[
    "might",
    "could",
    "may",
    "allegedly",
    "reportedly",
    "rumored",
    "possibly",
    "perhaps",
    "supposedly",
    "it is said",
    "sources say",
];

const EMOTIONAL_WEIGHT: f64 = 0.15;
const CERTAINTY_WEIGHT: f64 = 0.10;
const CONSPIRACY_WEIGHT: f64 = 0.10;
const OPINION_WEIGHT: f64 = 0.35;
const SPECULATION_WEIGHT: f64 = 0.15;
const PUNCTUATION_WEIGHT: f64 = 0.15;

const EMOTIONAL_SCALE: f64 = 20.0;
const DENSITY_SCALE: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulationSignals {
    pub emotional: f64,
    pub certainty: f64,
    pub conspiracy: f64,
    pub opinion: f64,
    pub speculation: f64,
    pub punctuation: f64,
}

impl ManipulationSignals {
    pub fn weighted(&self) -> f64 {
        self.emotional * EMOTIONAL_WEIGHT
            + self.certainty * CERTAINTY_WEIGHT
            + self.conspiracy * CONSPIRACY_WEIGHT
            + self.opinion * OPINION_WEIGHT
            + self.speculation * SPECULATION_WEIGHT
            + self.punctuation * PUNCTUATION_WEIGHT
    }
}

/// Occurrences of each phrase as a whole-token sequence in `words`.
fn phrase_hits(words: &[String], phrases: &[&str]) -> usize {
    phrases
        .iter()
        .map(|phrase| {
            let needle = lower_tokens(phrase);
            if needle.is_empty() || needle.len() > words.len() {
                return 0;
            }
            words.windows(needle.len()).filter(|w| *w == needle.as_slice()).count()
        })
        .sum()
}

fn is_shouting(token: &str) -> bool {
    let letters = token.chars().filter(|c| c.is_alphabetic()).count();
    letters >= 3 && token.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
}

pub fn signals(content: &str) -> ManipulationSignals {
    let words = lower_tokens(content);
    let per_hundred = |hits: usize| {
        if words.is_empty() {
            0.0
        } else {
            hits as f64 / words.len() as f64 * 100.0
        }
    };

    let exclamations = content.matches('!').count() as f64;
    let questions = content.matches('?').count() as f64;
    let shouting = tokens(content).filter(|t| is_shouting(t)).count() as f64;

    ManipulationSignals {
        emotional: (per_hundred(phrase_hits(&words, EMOTIONAL)) * EMOTIONAL_SCALE).min(100.0),
        certainty: (per_hundred(phrase_hits(&words, CERTAINTY)) * DENSITY_SCALE).min(100.0),
        conspiracy: if phrase_hits(&words, CONSPIRACY) > 0 { 100.0 } else { 0.0 },
        opinion: (per_hundred(phrase_hits(&words, OPINION)) * DENSITY_SCALE).min(100.0),
        speculation: (per_hundred(phrase_hits(&words, SPECULATION)) * DENSITY_SCALE).min(100.0),
        punctuation: (10.0 * exclamations + 5.0 * shouting + 5.0 * questions).min(100.0),
    }
}

pub fn manipulation_risk(content: &str) -> f64 {
    signals(content).weighted().clamp(0.0, 100.0)
}
