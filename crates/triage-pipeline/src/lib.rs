//! # triage-pipeline
//!
//! Batch orchestration for feedback classification: chunking, rate limiting,
//! AI routing with graceful degradation to a keyword fallback, sentiment
//! scoring, and correction tracking.

pub mod batch;
pub mod fallback;
pub mod metrics;
pub mod orchestrator;
pub mod rate_limit;
pub mod sentiment;

// Re-export commonly used types at crate root
pub use batch::optimal_size;
pub use fallback::KeywordClassifier;
pub use metrics::{AccuracyMetrics, CorrectionTracker};
pub use orchestrator::{ClassificationPipeline, PipelineConfig, ProgressCallback};
pub use rate_limit::RateLimiter;
pub use sentiment::SentimentAnalyzer;
