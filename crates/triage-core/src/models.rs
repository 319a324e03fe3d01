//! Data model for the feedback classification pipeline.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// CATEGORIES
// =============================================================================

/// A classification category supplied by the caller.
///
/// Categories are immutable during a classification run; the pipeline never
/// owns or persists them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique, stable identifier (e.g. "bug_report").
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description embedded into AI prompts.
    pub description: String,
    /// Keywords used by the fallback classifier, in priority order.
    pub keywords: Vec<String>,
    /// Inactive categories are ignored by both classifiers.
    pub active: bool,
}

impl Category {
    /// Create an active category.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        keywords: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            keywords,
            active: true,
        }
    }
}

/// Validated, immutable category list for one classification run.
///
/// Construction designates a default/general category: the category with id
/// [`defaults::DEFAULT_CATEGORY_ID`] if present and active, otherwise the
/// first active category in supplied order.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    default_idx: usize,
}

impl CategoryRegistry {
    /// Validate and wrap a caller-supplied category list.
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::Config("category registry cannot be empty".into()));
        }

        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.id.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate category id: {}",
                    category.id
                )));
            }
        }

        let default_idx = categories
            .iter()
            .position(|c| c.active && c.id == defaults::DEFAULT_CATEGORY_ID)
            .or_else(|| categories.iter().position(|c| c.active))
            .ok_or_else(|| {
                Error::Config("category registry must contain at least one active category".into())
            })?;

        Ok(Self {
            categories,
            default_idx,
        })
    }

    /// Look up a category by id.
    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// True if a category with this id exists (active or not).
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Active categories in supplied order.
    pub fn active(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.active)
    }

    /// The designated default/general category.
    pub fn default_category(&self) -> &Category {
        &self.categories[self.default_idx]
    }

    /// All categories, including inactive ones.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Total category count (including inactive).
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Never true for a successfully constructed registry.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// =============================================================================
// CLASSIFICATION RESULTS
// =============================================================================

/// Which path produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    /// Single-item AI call (per-item retry tier).
    AiSingle,
    /// Batched AI call.
    AiBatch,
    /// Deterministic keyword classifier.
    FallbackKeyword,
}

impl std::fmt::Display for ClassificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AiSingle => write!(f, "ai_single"),
            Self::AiBatch => write!(f, "ai_batch"),
            Self::FallbackKeyword => write!(f, "fallback_keyword"),
        }
    }
}

/// Category assignment for one feedback text.
///
/// Invariants: `category` is a member of the registry passed to the call
/// that produced it; `confidence` is clamped to [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Id of the assigned category.
    pub category: String,
    /// Classifier certainty in [0, 1].
    pub confidence: f32,
    /// Short natural-language rationale.
    pub reasoning: String,
    /// Phrases or keywords that drove the assignment.
    pub key_indicators: Vec<String>,
    /// Path that produced this result.
    pub method: ClassificationMethod,
    /// When the classification was produced.
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// SENTIMENT
// =============================================================================

/// Coarse sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Sentiment scoring for one feedback text. Computed locally, independent of
/// the AI category path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// 0.0 = fully negative, 1.0 = fully positive.
    pub score: f32,
    pub label: SentimentLabel,
    /// Certainty in the label, in [0, 1].
    pub confidence: f32,
    /// Detected discussion topics (e.g. "stability", "pricing").
    pub topics: Vec<String>,
}

// =============================================================================
// COMBINED OUTPUT RECORD
// =============================================================================

/// The combined, JSON-serializable record returned per input item.
///
/// Field names use camelCase on the wire to match downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackAnalysis {
    pub sentiment_score: f32,
    pub sentiment_label: SentimentLabel,
    pub sentiment_confidence: f32,
    pub topics: Vec<String>,
    pub ai_category: String,
    pub ai_category_confidence: f32,
    pub ai_reasoning: String,
    pub key_indicators: Vec<String>,
    pub method: ClassificationMethod,
    pub analysis_timestamp: DateTime<Utc>,
}

impl FeedbackAnalysis {
    /// Merge a classification and a sentiment result for one item.
    pub fn from_parts(classification: ClassificationResult, sentiment: SentimentResult) -> Self {
        Self {
            sentiment_score: sentiment.score,
            sentiment_label: sentiment.label,
            sentiment_confidence: sentiment.confidence,
            topics: sentiment.topics,
            ai_category: classification.category,
            ai_category_confidence: classification.confidence,
            ai_reasoning: classification.reasoning,
            key_indicators: classification.key_indicators,
            method: classification.method,
            analysis_timestamp: classification.timestamp,
        }
    }
}

// =============================================================================
// CORRECTIONS
// =============================================================================

/// A user override of an AI-assigned category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    /// Short excerpt of the corrected feedback text.
    pub text_excerpt: String,
    /// Category id the AI predicted.
    pub ai_prediction: String,
    /// Category id the user chose.
    pub user_correction: String,
    /// AI confidence at prediction time.
    pub ai_confidence_at_prediction: f32,
    /// True when prediction and correction agree.
    pub was_correct: bool,
    pub timestamp: DateTime<Utc>,
}

impl CorrectionRecord {
    /// Build a record; `was_correct` is derived from the two category ids.
    pub fn new(
        text_excerpt: impl Into<String>,
        ai_prediction: impl Into<String>,
        user_correction: impl Into<String>,
        ai_confidence_at_prediction: f32,
    ) -> Self {
        let ai_prediction = ai_prediction.into();
        let user_correction = user_correction.into();
        let was_correct = ai_prediction == user_correction;
        Self {
            text_excerpt: text_excerpt.into(),
            ai_prediction,
            user_correction,
            ai_confidence_at_prediction,
            was_correct,
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// PROGRESS REPORTING
// =============================================================================

/// Snapshot passed to the progress callback after each processed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    /// Items classified so far.
    pub processed: usize,
    /// Total items to classify.
    pub total: usize,
    /// Integer percentage of items processed.
    pub percentage: u8,
    pub batches_completed: usize,
    pub total_batches: usize,
}

impl ProgressUpdate {
    /// Build an update, computing the percentage.
    pub fn new(
        processed: usize,
        total: usize,
        batches_completed: usize,
        total_batches: usize,
    ) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            ((processed * 100) / total) as u8
        };
        Self {
            processed,
            total,
            percentage,
            batches_completed,
            total_batches,
        }
    }
}
