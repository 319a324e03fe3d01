//! Batch orchestrator: chunking, routing, recovery, pacing.
//!
//! Chunks are processed strictly one at a time so the inter-batch delay acts
//! as a global throttle. Every recoverable AI failure degrades through
//! per-item retry down to the keyword fallback; callers always get exactly
//! one result per surviving input, in input order.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use triage_core::defaults;
use triage_core::{
    CategoryRegistry, ClassificationResult, Error, FeedbackAnalysis, ProgressUpdate, Result,
    SentimentResult,
};
use triage_inference::{ClassificationClient, GeminiBackend};

use crate::batch;
use crate::fallback::KeywordClassifier;
use crate::metrics::CorrectionTracker;
use crate::rate_limit::RateLimiter;
use crate::sentiment::SentimentAnalyzer;

/// Callback invoked after each processed chunk.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sliding-window AI request quota.
    pub requests_per_minute: u32,
    /// Pause between consecutive AI chunk attempts.
    pub inter_batch_delay_ms: u64,
    /// Token budget handed to the batch sizer.
    pub token_budget: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: defaults::RATE_LIMIT_MAX_PER_MINUTE,
            inter_batch_delay_ms: defaults::INTER_BATCH_DELAY_MS,
            token_budget: defaults::TOKEN_BUDGET,
        }
    }
}

impl PipelineConfig {
    /// Create from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        Self {
            requests_per_minute: parse_var(
                "TRIAGE_REQUESTS_PER_MINUTE",
                defaults::RATE_LIMIT_MAX_PER_MINUTE,
            ),
            inter_batch_delay_ms: parse_var(
                "TRIAGE_INTER_BATCH_DELAY_MS",
                defaults::INTER_BATCH_DELAY_MS,
            ),
            token_budget: parse_var("TRIAGE_TOKEN_BUDGET", defaults::TOKEN_BUDGET),
        }
    }
}

/// The feedback classification pipeline.
///
/// Owns the routing policy: AI when configured and under quota, keyword
/// fallback otherwise. Rate limiter access is single-writer; check and
/// record happen under one lock.
pub struct ClassificationPipeline {
    client: Option<ClassificationClient>,
    fallback: KeywordClassifier,
    sentiment: SentimentAnalyzer,
    rate_limiter: Mutex<RateLimiter>,
    tracker: Arc<CorrectionTracker>,
    config: PipelineConfig,
}

impl ClassificationPipeline {
    /// Build a pipeline with an optional AI client.
    ///
    /// `client: None` is the first-class fallback-only mode, not an error.
    pub fn new(client: Option<ClassificationClient>, config: PipelineConfig) -> Result<Self> {
        if client.is_none() {
            info!(
                subsystem = "pipeline",
                component = "orchestrator",
                "No AI client configured, running in fallback-only mode"
            );
        }
        Ok(Self {
            fallback: KeywordClassifier::new(),
            sentiment: SentimentAnalyzer::new()?,
            rate_limiter: Mutex::new(RateLimiter::new(config.requests_per_minute)),
            tracker: Arc::new(CorrectionTracker::new(defaults::CORRECTION_HISTORY_CAP)),
            client,
            config,
        })
    }

    /// Build from environment variables.
    ///
    /// The AI client exists only when `GEMINI_API_KEY` is set.
    pub fn from_env() -> Result<Self> {
        let client = GeminiBackend::from_env().map(|b| ClassificationClient::new(Arc::new(b)));
        Self::new(client, PipelineConfig::from_env())
    }

    /// True when an AI client is configured.
    pub fn ai_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Shared correction tracker for this pipeline.
    pub fn corrections(&self) -> Arc<CorrectionTracker> {
        Arc::clone(&self.tracker)
    }

    /// Classify all texts, combining categories with sentiment.
    ///
    /// Empty and whitespace-only texts are filtered out first; if nothing
    /// remains the call fails with [`Error::NoValidInput`]. Otherwise every
    /// surviving text yields exactly one [`FeedbackAnalysis`], in input
    /// order, tagged with the method that actually produced it.
    ///
    /// Cancellation is checked at the top of each chunk and during the
    /// inter-batch delay; on cancellation partial results are discarded and
    /// [`Error::Cancelled`] is returned.
    #[instrument(skip_all, fields(subsystem = "pipeline", component = "orchestrator", op = "run", input_count = texts.len()))]
    pub async fn run(
        &self,
        texts: &[String],
        registry: &CategoryRegistry,
        max_batch_size: usize,
        on_progress: Option<ProgressCallback>,
        cancel: CancellationToken,
    ) -> Result<Vec<FeedbackAnalysis>> {
        let start = std::time::Instant::now();

        let valid: Vec<String> = texts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();
        if valid.is_empty() {
            return Err(Error::NoValidInput(format!(
                "no non-empty texts among {} inputs",
                texts.len()
            )));
        }

        let batch_size = batch::optimal_size(&valid, max_batch_size, self.config.token_budget);
        let chunks: Vec<&[String]> = valid.chunks(batch_size).collect();
        let total = valid.len();
        let total_batches = chunks.len();

        debug!(
            batch_size = batch_size,
            total_batches = total_batches,
            "Computed run plan"
        );

        let mut results: Vec<FeedbackAnalysis> = Vec::with_capacity(total);
        let mut processed = 0usize;

        for (chunk_index, chunk) in chunks.into_iter().enumerate() {
            if cancel.is_cancelled() {
                info!(chunk_index = chunk_index, "Run cancelled, discarding partial results");
                return Err(Error::Cancelled);
            }

            let route = self.route_chunk(chunk_index);
            let attempted_ai = route.is_some();

            let (sentiments, classifications) = match route {
                None => (
                    self.analyze_sentiments(chunk),
                    chunk
                        .iter()
                        .map(|t| self.fallback.classify(t, registry))
                        .collect(),
                ),
                Some(client) => {
                    let (sentiments, batch_result) = tokio::join!(
                        async { self.analyze_sentiments(chunk) },
                        client.classify_batch(chunk, registry),
                    );
                    let classifications = match batch_result {
                        Ok(list) => list,
                        Err(err) => {
                            warn!(
                                chunk_index = chunk_index,
                                chunk_size = chunk.len(),
                                error = %err,
                                "Batch classification failed, retrying per item"
                            );
                            self.recover_per_item(client, chunk, registry).await
                        }
                    };
                    (sentiments, classifications)
                }
            };

            for (classification, sentiment) in classifications.into_iter().zip(sentiments) {
                results.push(FeedbackAnalysis::from_parts(classification, sentiment));
            }

            processed += chunk.len();
            let batches_completed = chunk_index + 1;
            if let Some(callback) = &on_progress {
                callback(ProgressUpdate::new(
                    processed,
                    total,
                    batches_completed,
                    total_batches,
                ));
            }

            let is_last = batches_completed == total_batches;
            if attempted_ai && !is_last {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!(chunk_index = chunk_index, "Run cancelled during inter-batch delay");
                        return Err(Error::Cancelled);
                    }
                    _ = sleep(Duration::from_millis(self.config.inter_batch_delay_ms)) => {}
                }
            }
        }

        info!(
            result_count = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Run complete"
        );
        Ok(results)
    }

    /// Decide whether this chunk gets an AI call.
    ///
    /// Returns the client only when one is configured and the rate limiter
    /// admits the request; admission and recording happen under one lock.
    fn route_chunk(&self, chunk_index: usize) -> Option<&ClassificationClient> {
        let client = self.client.as_ref()?;
        let mut limiter = self
            .rate_limiter
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if limiter.allow_request() {
            limiter.record_request();
            Some(client)
        } else {
            warn!(
                subsystem = "pipeline",
                component = "rate_limit",
                chunk_index = chunk_index,
                "Rate limit reached, routing chunk to keyword fallback"
            );
            None
        }
    }

    fn analyze_sentiments(&self, chunk: &[String]) -> Vec<SentimentResult> {
        chunk.iter().map(|t| self.sentiment.analyze(t)).collect()
    }

    /// Per-item recovery tier after a failed batch call.
    ///
    /// Each item gets one single-item AI attempt; a second failure drops
    /// that item to the keyword fallback. Always returns one result per
    /// item.
    async fn recover_per_item(
        &self,
        client: &ClassificationClient,
        chunk: &[String],
        registry: &CategoryRegistry,
    ) -> Vec<ClassificationResult> {
        let mut results = Vec::with_capacity(chunk.len());
        for text in chunk {
            match client.classify_one(text, registry).await {
                Ok(result) => results.push(result),
                Err(err) => {
                    warn!(
                        error = %err,
                        method = "fallback_keyword",
                        "Per-item classification failed, using keyword fallback"
                    );
                    results.push(self.fallback.classify(text, registry));
                }
            }
        }
        results
    }
}
