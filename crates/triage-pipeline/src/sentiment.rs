//! Lexicon-based sentiment analyzer.
//!
//! Pure and local: scores every feedback item independently of the AI
//! category path and never fails at analysis time. Word lists are compiled
//! into Aho-Corasick automata once at construction.

use aho_corasick::AhoCorasick;

use triage_core::{Error, Result, SentimentLabel, SentimentResult};

/// Score at or above which the label is positive.
const POSITIVE_THRESHOLD: f32 = 0.6;

/// Score at or below which the label is negative.
const NEGATIVE_THRESHOLD: f32 = 0.4;

/// Confidence when the text contains no sentiment words at all.
const NO_SIGNAL_CONFIDENCE: f32 = 0.3;

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "love",
    "amazing",
    "wonderful",
    "happy",
    "fantastic",
    "awesome",
    "best",
    "helpful",
    "useful",
    "easy",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "hate",
    "horrible",
    "worst",
    "sad",
    "angry",
    "disappointed",
    "poor",
    "broken",
    "crash",
    "useless",
    "frustrating",
    "annoying",
];

/// Topic keywords paired with the topic they signal.
const TOPIC_WORDS: &[(&str, &str)] = &[
    ("crash", "stability"),
    ("error", "stability"),
    ("freeze", "stability"),
    ("bug", "stability"),
    ("price", "pricing"),
    ("cost", "pricing"),
    ("expensive", "pricing"),
    ("subscription", "pricing"),
    ("slow", "performance"),
    ("lag", "performance"),
    ("battery", "performance"),
    ("interface", "usability"),
    ("design", "usability"),
    ("layout", "usability"),
    ("confusing", "usability"),
    ("navigation", "usability"),
    ("support", "support"),
    ("customer service", "support"),
];

/// Lexicon sentiment analyzer.
pub struct SentimentAnalyzer {
    positive: AhoCorasick,
    negative: AhoCorasick,
    topics: AhoCorasick,
}

impl SentimentAnalyzer {
    pub fn new() -> Result<Self> {
        let positive = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(POSITIVE_WORDS)
            .map_err(|e| {
                Error::Internal(format!("Failed to build positive sentiment matcher: {e}"))
            })?;

        let negative = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(NEGATIVE_WORDS)
            .map_err(|e| {
                Error::Internal(format!("Failed to build negative sentiment matcher: {e}"))
            })?;

        let topics = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(TOPIC_WORDS.iter().map(|(word, _)| *word))
            .map_err(|e| Error::Internal(format!("Failed to build topic matcher: {e}")))?;

        Ok(Self {
            positive,
            negative,
            topics,
        })
    }

    /// Score one feedback text.
    pub fn analyze(&self, text: &str) -> SentimentResult {
        let positive_hits = self.positive.find_iter(text).count() as f32;
        let negative_hits = self.negative.find_iter(text).count() as f32;
        let total = positive_hits + negative_hits;

        let score = if total == 0.0 {
            0.5
        } else {
            positive_hits / total
        };

        let label = if total == 0.0 {
            SentimentLabel::Neutral
        } else if score >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        let confidence = if total == 0.0 {
            NO_SIGNAL_CONFIDENCE
        } else {
            (0.5 + 0.1 * total).min(0.9)
        };

        let mut topics = Vec::new();
        for hit in self.topics.find_iter(text) {
            let topic = TOPIC_WORDS[hit.pattern().as_usize()].1.to_string();
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }

        SentimentResult {
            score,
            label,
            confidence,
            topics,
        }
    }
}
