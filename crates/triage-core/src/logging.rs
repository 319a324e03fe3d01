//! Structured logging schema and field name constants for triage.
//!
//! All crates use these constants for consistent structured logging fields
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, run completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "inference", "pipeline"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "gemini", "orchestrator", "rate_limit", "fallback"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "generate", "classify_batch", "run"
pub const OPERATION: &str = "op";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of input texts in a run or batch.
pub const INPUT_COUNT: &str = "input_count";

/// Number of items in the current chunk.
pub const CHUNK_SIZE: &str = "chunk_size";

/// Index of the current chunk within a run (0-based).
pub const CHUNK_INDEX: &str = "chunk_index";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for generation.
pub const MODEL: &str = "model";

/// Classification method tag ("ai_single", "ai_batch", "fallback_keyword").
pub const METHOD: &str = "method";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
