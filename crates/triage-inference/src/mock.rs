//! Mock generation backend for deterministic testing.
//!
//! Provides a scriptable implementation of [`GenerationBackend`] that replays
//! queued replies and failures, logs every call, and can simulate latency and
//! random failures.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use triage_core::{Error, GenerationBackend, Result};

/// A single scripted outcome for a generate call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this text.
    Reply(String),
    /// Fail with `Error::Request` carrying this message.
    Fail(String),
}

/// One logged generate call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub timestamp: std::time::Instant,
}

#[derive(Debug, Clone)]
struct MockConfig {
    default_response: String,
    latency_ms: u64,
    failure_rate: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_response: "Mock response".to_string(),
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

/// Scriptable mock generation backend.
///
/// Scripted replies are consumed in FIFO order; once the script is empty the
/// backend returns the default response (or random failures when a failure
/// rate is set).
#[derive(Clone)]
pub struct MockBackend {
    config: Arc<MockConfig>,
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response returned when the script is exhausted.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Queue a successful reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Reply(reply.into()));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Fail(message.into()));
        self
    }

    /// Set simulated latency for all calls.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Set failure rate (0.0 - 1.0) for unscripted calls.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of generate calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    fn should_fail(&self) -> bool {
        use rand::Rng;
        if self.config.failure_rate > 0.0 {
            rand::thread_rng().gen::<f64>() < self.config.failure_rate
        } else {
            false
        }
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.call_log.lock().unwrap().push(MockCall {
            prompt: prompt.to_string(),
            timestamp: std::time::Instant::now(),
        });
        self.simulate_latency().await;

        let scripted = self.script.lock().unwrap().pop_front();
        if let Some(reply) = scripted {
            return match reply {
                ScriptedReply::Reply(text) => Ok(text),
                ScriptedReply::Fail(msg) => Err(Error::Request(msg)),
            };
        }

        if self.should_fail() {
            return Err(Error::Request("simulated failure".to_string()));
        }

        Ok(self.config.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_response() {
        let backend = MockBackend::new();
        let out = backend.generate("hello").await.unwrap();
        assert_eq!(out, "Mock response");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_replies_fifo() {
        let backend = MockBackend::new()
            .with_reply("first")
            .with_failure("boom")
            .with_reply("third");

        assert_eq!(backend.generate("a").await.unwrap(), "first");
        let err = backend.generate("b").await.unwrap_err();
        assert!(matches!(err, Error::Request(msg) if msg == "boom"));
        assert_eq!(backend.generate("c").await.unwrap(), "third");

        // Script exhausted, falls back to default
        assert_eq!(backend.generate("d").await.unwrap(), "Mock response");
    }

    #[tokio::test]
    async fn test_call_log_records_prompts() {
        let backend = MockBackend::new();
        backend.generate("prompt one").await.unwrap();
        backend.generate("prompt two").await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].prompt, "prompt one");
        assert_eq!(calls[1].prompt, "prompt two");

        backend.clear_calls();
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_always_fail() {
        let backend = MockBackend::new().with_failure_rate(1.0);
        let err = backend.generate("x").await.unwrap_err();
        assert!(matches!(err, Error::Request(_)));
    }

    #[tokio::test]
    async fn test_clone_shares_script_and_log() {
        let backend = MockBackend::new().with_reply("shared");
        let clone = backend.clone();

        assert_eq!(clone.generate("x").await.unwrap(), "shared");
        assert_eq!(backend.call_count(), 1);
    }

    #[test]
    fn test_model_name() {
        assert_eq!(MockBackend::new().model_name(), "mock");
    }
}
