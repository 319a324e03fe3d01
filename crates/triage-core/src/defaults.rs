//! Centralized default constants for the triage pipeline.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates should reference these constants instead of defining
//! their own magic numbers.

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Default maximum AI requests per sliding window. Tuned for a conservative
/// external free-tier quota.
pub const RATE_LIMIT_MAX_PER_MINUTE: u32 = 15;

/// Sliding window length in seconds.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

// =============================================================================
// BATCH SIZING
// =============================================================================

/// Floor on computed batch size.
pub const MIN_BATCH_SIZE: usize = 5;

/// Ceiling on computed batch size.
pub const MAX_BATCH_SIZE: usize = 20;

/// Batch size used when the input is empty or degenerate.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Conservative token budget for a single batch request.
pub const TOKEN_BUDGET: usize = 2000;

/// Minimum token estimate per item regardless of measured length.
pub const TOKENS_PER_ITEM_FLOOR: usize = 50;

/// Rough characters-per-token divisor for the token estimate.
pub const CHARS_PER_TOKEN: usize = 4;

// =============================================================================
// ORCHESTRATION
// =============================================================================

/// Pause between consecutive AI batch calls in milliseconds. This pacing is
/// what keeps a long run under the per-minute quota even though the rate
/// limiter check is advisory per chunk.
pub const INTER_BATCH_DELAY_MS: u64 = 2000;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Gemini API base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const GEN_MODEL: &str = "gemini-2.0-flash";

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// CATEGORIES
// =============================================================================

/// Registry id preferred as the default/general category.
pub const DEFAULT_CATEGORY_ID: &str = "general_inquiry";

// =============================================================================
// KEYWORD FALLBACK CONFIDENCE
// =============================================================================

/// Per-score-point confidence weight.
pub const FALLBACK_SCORE_WEIGHT: f32 = 0.15;

/// Cap on the score-derived portion of confidence.
pub const FALLBACK_SCORE_CAP: f32 = 0.7;

/// Bonus when more than one distinct keyword matched.
pub const FALLBACK_MULTI_KEYWORD_BONUS: f32 = 0.10;

/// Bonus when the average matched-keyword length exceeds 5 characters.
pub const FALLBACK_LONG_KEYWORD_BONUS: f32 = 0.05;

/// Hard ceiling on fallback confidence.
pub const FALLBACK_MAX_CONFIDENCE: f32 = 0.8;

/// Confidence assigned when no keyword matched at all.
pub const FALLBACK_DEFAULT_CONFIDENCE: f32 = 0.3;

/// Keywords longer than this count double in the match score.
pub const FALLBACK_LONG_KEYWORD_LEN: usize = 3;

// =============================================================================
// CORRECTION TRACKING
// =============================================================================

/// Maximum retained correction records (ring buffer capacity).
pub const CORRECTION_HISTORY_CAP: usize = 100;

/// Below this AI confidence an incorrect prediction counts as "low confidence".
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Above this AI confidence an incorrect prediction counts as "overconfident".
pub const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.8;

/// Average-confidence floor below which keyword refinement is suggested.
pub const AVG_CONFIDENCE_FLOOR: f32 = 0.7;

/// Share of low-confidence incorrect predictions that triggers the
/// "refine keywords" suggestion.
pub const LOW_CONF_INCORRECT_RATIO: f32 = 0.20;

/// Share of high-confidence incorrect predictions that triggers the
/// "review category overlap" suggestion.
pub const HIGH_CONF_INCORRECT_RATIO: f32 = 0.10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_bounds_are_consistent() {
        const {
            assert!(MIN_BATCH_SIZE <= DEFAULT_BATCH_SIZE);
            assert!(DEFAULT_BATCH_SIZE <= MAX_BATCH_SIZE);
            assert!(TOKEN_BUDGET / TOKENS_PER_ITEM_FLOOR >= MIN_BATCH_SIZE);
        }
    }

    #[test]
    fn fallback_confidence_bounds_ordered() {
        assert!(FALLBACK_DEFAULT_CONFIDENCE < FALLBACK_SCORE_CAP);
        assert!(FALLBACK_SCORE_CAP < FALLBACK_MAX_CONFIDENCE);
        assert!(FALLBACK_MAX_CONFIDENCE <= 1.0);
    }

    #[test]
    fn correction_thresholds_ordered() {
        assert!(LOW_CONFIDENCE_THRESHOLD < HIGH_CONFIDENCE_THRESHOLD);
    }
}
