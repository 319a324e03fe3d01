//! Keyword fallback classifier.
//!
//! Deterministic, infallible, never touches the network. This is the path
//! every item is guaranteed to have when the AI side is absent, throttled,
//! or misbehaving.

use chrono::Utc;

use triage_core::defaults;
use triage_core::{Category, CategoryRegistry, ClassificationMethod, ClassificationResult};

/// Average matched-keyword length above which the long-keyword bonus applies.
const LONG_AVG_KEYWORD_LEN: f32 = 5.0;

/// Deterministic keyword-scoring classifier.
#[derive(Debug, Default, Clone)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify one text against the registry's active categories.
    ///
    /// Scoring: each keyword occurring as a substring of the lowercased text
    /// scores 1, or 2 when longer than
    /// [`defaults::FALLBACK_LONG_KEYWORD_LEN`] characters. Highest score
    /// wins; ties keep the first category in registry order. No match at all
    /// assigns the registry's default category at low confidence.
    pub fn classify(&self, text: &str, registry: &CategoryRegistry) -> ClassificationResult {
        let lowered = text.to_lowercase();

        let mut best: Option<(&Category, u32, Vec<String>)> = None;
        for category in registry.active() {
            let mut score = 0u32;
            let mut matched = Vec::new();
            for keyword in &category.keywords {
                let needle = keyword.to_lowercase();
                if !needle.is_empty() && lowered.contains(&needle) {
                    score += if keyword.chars().count() > defaults::FALLBACK_LONG_KEYWORD_LEN {
                        2
                    } else {
                        1
                    };
                    matched.push(keyword.clone());
                }
            }
            if score > 0 && best.as_ref().map_or(true, |(_, s, _)| score > *s) {
                best = Some((category, score, matched));
            }
        }

        let timestamp = Utc::now();
        match best {
            Some((category, score, matched)) => {
                let mut confidence =
                    (score as f32 * defaults::FALLBACK_SCORE_WEIGHT).min(defaults::FALLBACK_SCORE_CAP);
                if matched.len() > 1 {
                    confidence += defaults::FALLBACK_MULTI_KEYWORD_BONUS;
                }
                let avg_len = matched.iter().map(|k| k.chars().count()).sum::<usize>() as f32
                    / matched.len() as f32;
                if avg_len > LONG_AVG_KEYWORD_LEN {
                    confidence += defaults::FALLBACK_LONG_KEYWORD_BONUS;
                }
                let confidence = confidence.min(defaults::FALLBACK_MAX_CONFIDENCE);

                ClassificationResult {
                    category: category.id.clone(),
                    confidence,
                    reasoning: format!("Matched keywords: {}", matched.join(", ")),
                    key_indicators: matched,
                    method: ClassificationMethod::FallbackKeyword,
                    timestamp,
                }
            }
            None => {
                let default = registry.default_category();
                ClassificationResult {
                    category: default.id.clone(),
                    confidence: defaults::FALLBACK_DEFAULT_CONFIDENCE,
                    reasoning: format!("No keywords matched; defaulted to {}", default.id),
                    key_indicators: Vec::new(),
                    method: ClassificationMethod::FallbackKeyword,
                    timestamp,
                }
            }
        }
    }
}
