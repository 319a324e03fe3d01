//! Core trait definitions shared across triage crates.

use async_trait::async_trait;

use crate::error::Result;

/// Text generation backend.
///
/// The single logical external operation of the pipeline: send a prompt,
/// receive raw model output. Implementations handle transport, auth, and
/// timeouts; callers handle parsing and fallback policy.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Name of the underlying model, for logging.
    fn model_name(&self) -> &str;
}
