//! Gemini generation backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use triage_core::{Error, GenerationBackend, Result};

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_URL: &str = triage_core::defaults::GEMINI_BASE_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = triage_core::defaults::GEN_MODEL;

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = triage_core::defaults::GEN_TIMEOUT_SECS;

/// Gemini generation backend.
///
/// Only constructed when an API key is available; callers treat the absence
/// of a backend as the fallback-only operating mode.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl GeminiBackend {
    /// Create a backend with explicit configuration.
    pub fn with_config(base_url: String, model: String, api_key: String) -> Self {
        let timeout_secs = std::env::var("TRIAGE_GEN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(GEN_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!("Initializing Gemini backend: url={}, model={}", base_url, model);

        Self {
            client,
            base_url,
            model,
            api_key,
            timeout_secs,
        }
    }

    /// Create from environment variables.
    ///
    /// Returns `None` when `GEMINI_API_KEY` is unset or empty; the pipeline
    /// then runs in fallback-only mode. Base URL and model come from
    /// `TRIAGE_GEMINI_BASE` and `TRIAGE_GEN_MODEL` with defaults.
    pub fn from_env() -> Option<Self> {
        let api_key = match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ => {
                debug!("GEMINI_API_KEY not set, no Gemini backend");
                return None;
            }
        };

        let base_url =
            std::env::var("TRIAGE_GEMINI_BASE").unwrap_or_else(|_| DEFAULT_GEMINI_URL.to_string());
        let model =
            std::env::var("TRIAGE_GEN_MODEL").unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string());

        Some(Self::with_config(base_url, model, api_key))
    }
}

/// Request payload for the Gemini `generateContent` endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

/// Response from the Gemini `generateContent` endpoint.
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "gemini", op = "generate", model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig { temperature: 0.2 }),
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!("Gemini returned {}: {}", status, body)));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Request(format!("Failed to parse response: {}", e)))?;

        let content = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if content.is_empty() {
            return Err(Error::Request("Gemini returned no candidates".to_string()));
        }

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = content.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > 10_000 {
            warn!(
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                slow = true,
                "Slow generation operation"
            );
        }
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
