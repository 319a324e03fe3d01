//! # triage-inference
//!
//! AI classification client and generation backends for the triage pipeline.
//!
//! Provides the Gemini HTTP backend, a scriptable mock backend for tests,
//! prompt construction, and strict response validation. The client produces
//! validated classification results; routing and fallback policy belong to
//! the pipeline crate.

pub mod client;
pub mod gemini;
pub mod prompt;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::ClassificationClient;
pub use gemini::GeminiBackend;
