//! Batch sizing from a token budget.

use triage_core::defaults;

/// Compute the batch size for a run. Pure function.
///
/// Estimates tokens per item as `max(50, ceil(avg_chars / 4))`, fits as many
/// items as the token budget allows, then clamps to
/// `[MIN_BATCH_SIZE, MAX_BATCH_SIZE]` after applying the caller's cap.
/// Degenerate input (empty slice) falls back to the default batch size.
pub fn optimal_size(texts: &[String], max_batch_size: usize, token_budget: usize) -> usize {
    let candidate = if texts.is_empty() {
        defaults::DEFAULT_BATCH_SIZE
    } else {
        let total_chars: usize = texts.iter().map(|t| t.chars().count()).sum();
        let avg_chars = total_chars as f64 / texts.len() as f64;
        let tokens_per_item = defaults::TOKENS_PER_ITEM_FLOOR
            .max((avg_chars / defaults::CHARS_PER_TOKEN as f64).ceil() as usize);
        (token_budget / tokens_per_item).max(1)
    };

    candidate
        .min(max_batch_size)
        .clamp(defaults::MIN_BATCH_SIZE, defaults::MAX_BATCH_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts_of_len(count: usize, len: usize) -> Vec<String> {
        vec!["x".repeat(len); count]
    }

    #[test]
    fn short_texts_hit_the_caller_cap() {
        // 50-token floor fits 40 items in the default budget, so the caller
        // cap and MAX_BATCH_SIZE govern.
        let texts = texts_of_len(30, 40);
        assert_eq!(optimal_size(&texts, 15, defaults::TOKEN_BUDGET), 15);
        assert_eq!(optimal_size(&texts, 100, defaults::TOKEN_BUDGET), defaults::MAX_BATCH_SIZE);
    }

    #[test]
    fn long_texts_shrink_the_batch() {
        // 2000-char items estimate 500 tokens each, 4 fit in 2000, clamped
        // up to the floor.
        let texts = texts_of_len(10, 2000);
        assert_eq!(
            optimal_size(&texts, 20, defaults::TOKEN_BUDGET),
            defaults::MIN_BATCH_SIZE
        );
    }

    #[test]
    fn empty_input_uses_default_size() {
        assert_eq!(
            optimal_size(&[], 20, defaults::TOKEN_BUDGET),
            defaults::DEFAULT_BATCH_SIZE
        );
    }

    #[test]
    fn result_never_exceeds_bounds() {
        let cases = [
            (texts_of_len(1, 1), 1usize),
            (texts_of_len(5, 100), 7),
            (texts_of_len(50, 10_000), 50),
            (Vec::new(), 3),
        ];
        for (texts, cap) in cases {
            let size = optimal_size(&texts, cap, defaults::TOKEN_BUDGET);
            assert!(size >= defaults::MIN_BATCH_SIZE);
            assert!(size <= defaults::MAX_BATCH_SIZE);
        }
    }

    #[test]
    fn pure_and_deterministic() {
        let texts = texts_of_len(8, 300);
        let a = optimal_size(&texts, 12, defaults::TOKEN_BUDGET);
        let b = optimal_size(&texts, 12, defaults::TOKEN_BUDGET);
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_budget_still_respects_floor() {
        let texts = texts_of_len(10, 400);
        assert_eq!(optimal_size(&texts, 20, 10), defaults::MIN_BATCH_SIZE);
    }
}
