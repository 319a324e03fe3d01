//! AI classification client: prompt dispatch, response parsing, strict
//! validation.
//!
//! The client turns raw model output into validated [`ClassificationResult`]s
//! and nothing more. Fallback policy, rate limiting, and retries live in the
//! orchestrator; every validation failure surfaces as
//! [`Error::InvalidResponse`] for the caller to recover from.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, warn};

use triage_core::{
    CategoryRegistry, ClassificationMethod, ClassificationResult, Error, GenerationBackend, Result,
};

use crate::prompt;

/// Classification client over a generation backend.
#[derive(Clone)]
pub struct ClassificationClient {
    backend: Arc<dyn GenerationBackend>,
}

/// Reply shape for a single-item classification.
#[derive(Debug, Deserialize)]
struct RawSingle {
    category: String,
    confidence: f32,
    #[serde(default)]
    reasoning: String,
    #[serde(default, alias = "keyIndicators")]
    key_indicators: Vec<String>,
}

/// Reply shape for one item of a batched classification.
#[derive(Debug, Deserialize)]
struct RawBatchItem {
    index: usize,
    category: String,
    confidence: f32,
    #[serde(default)]
    reasoning: String,
    #[serde(default, alias = "keyIndicators")]
    key_indicators: Vec<String>,
}

impl ClassificationClient {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Name of the underlying model.
    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Classify a single feedback text.
    pub async fn classify_one(
        &self,
        text: &str,
        registry: &CategoryRegistry,
    ) -> Result<ClassificationResult> {
        let prompt = prompt::single_prompt(text, registry);
        let raw = self.backend.generate(&prompt).await?;

        debug!(
            subsystem = "inference",
            component = "client",
            op = "classify_one",
            response_len = raw.len(),
            "Parsing single classification reply"
        );

        let object = extract_json_object(&raw)?;
        let parsed: RawSingle = serde_json::from_str(object)
            .map_err(|e| Error::InvalidResponse(format!("unparseable JSON object: {}", e)))?;

        validate_category(&parsed.category, registry)?;

        Ok(ClassificationResult {
            category: parsed.category,
            confidence: clamp_confidence(parsed.confidence),
            reasoning: parsed.reasoning,
            key_indicators: parsed.key_indicators,
            method: ClassificationMethod::AiSingle,
            timestamp: Utc::now(),
        })
    }

    /// Classify a batch of feedback texts in one call.
    ///
    /// Results are returned in input order regardless of reply order; the
    /// reply must cover every index 1..=n exactly once.
    pub async fn classify_batch(
        &self,
        texts: &[String],
        registry: &CategoryRegistry,
    ) -> Result<Vec<ClassificationResult>> {
        let prompt = prompt::batch_prompt(texts, registry);
        let raw = self.backend.generate(&prompt).await?;

        debug!(
            subsystem = "inference",
            component = "client",
            op = "classify_batch",
            input_count = texts.len(),
            response_len = raw.len(),
            "Parsing batch classification reply"
        );

        let array = extract_json_array(&raw)?;
        let parsed: Vec<RawBatchItem> = serde_json::from_str(array)
            .map_err(|e| Error::InvalidResponse(format!("unparseable JSON array: {}", e)))?;

        if parsed.len() != texts.len() {
            return Err(Error::InvalidResponse(format!(
                "expected {} results, got {}",
                texts.len(),
                parsed.len()
            )));
        }

        let timestamp = Utc::now();
        let mut slots: Vec<Option<ClassificationResult>> = vec![None; texts.len()];
        for item in parsed {
            if item.index < 1 || item.index > texts.len() {
                return Err(Error::InvalidResponse(format!(
                    "index {} outside 1..={}",
                    item.index,
                    texts.len()
                )));
            }
            let slot = &mut slots[item.index - 1];
            if slot.is_some() {
                return Err(Error::InvalidResponse(format!(
                    "duplicate index {}",
                    item.index
                )));
            }
            validate_category(&item.category, registry)?;
            *slot = Some(ClassificationResult {
                category: item.category,
                confidence: clamp_confidence(item.confidence),
                reasoning: item.reasoning,
                key_indicators: item.key_indicators,
                method: ClassificationMethod::AiBatch,
                timestamp,
            });
        }

        // Length and uniqueness checks above guarantee every slot is filled.
        slots
            .into_iter()
            .map(|s| s.ok_or_else(|| Error::Internal("unfilled batch slot".to_string())))
            .collect()
    }
}

/// Reject category ids the registry does not know.
fn validate_category(id: &str, registry: &CategoryRegistry) -> Result<()> {
    if registry.contains(id) {
        Ok(())
    } else {
        Err(Error::InvalidResponse(format!(
            "unknown category id: {}",
            id
        )))
    }
}

/// Clamp confidence into [0, 1], logging when the model misbehaved.
fn clamp_confidence(confidence: f32) -> f32 {
    if !(0.0..=1.0).contains(&confidence) {
        warn!(
            subsystem = "inference",
            component = "client",
            confidence = confidence,
            "Model returned out-of-range confidence, clamping"
        );
    }
    confidence.clamp(0.0, 1.0)
}

/// Locate the first JSON array substring in a raw model reply.
///
/// Models routinely wrap JSON in markdown fences or prose; this strips
/// everything outside the outermost brackets.
fn extract_json_array(raw: &str) -> Result<&str> {
    let start = raw
        .find('[')
        .ok_or_else(|| Error::InvalidResponse("no JSON array in response".to_string()))?;
    let end = raw
        .rfind(']')
        .filter(|&end| end > start)
        .ok_or_else(|| Error::InvalidResponse("unterminated JSON array in response".to_string()))?;
    Ok(&raw[start..=end])
}

/// Locate the first JSON object substring in a raw model reply.
fn extract_json_object(raw: &str) -> Result<&str> {
    let start = raw
        .find('{')
        .ok_or_else(|| Error::InvalidResponse("no JSON object in response".to_string()))?;
    let end = raw
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| {
            Error::InvalidResponse("unterminated JSON object in response".to_string())
        })?;
    Ok(&raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use triage_core::Category;

    fn registry() -> CategoryRegistry {
        CategoryRegistry::new(vec![
            Category::new(
                "bug_report",
                "Bug Report",
                "Crashes and errors",
                vec!["crash".into()],
            ),
            Category::new(
                "feature_request",
                "Feature Request",
                "New functionality",
                vec!["wish".into()],
            ),
            Category::new("general_inquiry", "General Inquiry", "Everything else", vec![]),
        ])
        .unwrap()
    }

    fn client_with(backend: MockBackend) -> ClassificationClient {
        ClassificationClient::new(Arc::new(backend))
    }

    fn batch_reply(items: &[(usize, &str, f32)]) -> String {
        let objects: Vec<String> = items
            .iter()
            .map(|(index, category, confidence)| {
                format!(
                    r#"{{"index": {index}, "category": "{category}", "confidence": {confidence}, "reasoning": "r", "keyIndicators": ["k"]}}"#
                )
            })
            .collect();
        format!("[{}]", objects.join(","))
    }

    // ==========================================================================
    // JSON extraction
    // ==========================================================================

    #[test]
    fn extracts_array_from_fenced_reply() {
        let raw = "```json\n[{\"index\": 1}]\n```";
        assert_eq!(extract_json_array(raw).unwrap(), "[{\"index\": 1}]");
    }

    #[test]
    fn extracts_object_from_prose() {
        let raw = "Here you go: {\"category\": \"bug_report\"} hope that helps";
        assert_eq!(
            extract_json_object(raw).unwrap(),
            "{\"category\": \"bug_report\"}"
        );
    }

    #[test]
    fn missing_array_is_invalid_response() {
        assert!(matches!(
            extract_json_array("no json here"),
            Err(Error::InvalidResponse(_))
        ));
    }

    // ==========================================================================
    // Single classification
    // ==========================================================================

    #[tokio::test]
    async fn classify_one_parses_valid_reply() {
        let backend = MockBackend::new().with_reply(
            r#"{"category": "bug_report", "confidence": 0.92, "reasoning": "mentions a crash", "keyIndicators": ["crash"]}"#,
        );
        let client = client_with(backend);

        let result = client
            .classify_one("the app crashed", &registry())
            .await
            .unwrap();
        assert_eq!(result.category, "bug_report");
        assert!((result.confidence - 0.92).abs() < 1e-6);
        assert_eq!(result.method, ClassificationMethod::AiSingle);
        assert_eq!(result.key_indicators, vec!["crash"]);
    }

    #[tokio::test]
    async fn classify_one_rejects_unknown_category() {
        let backend = MockBackend::new()
            .with_reply(r#"{"category": "nonexistent", "confidence": 0.9}"#);
        let client = client_with(backend);

        let err = client.classify_one("text", &registry()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(msg) if msg.contains("nonexistent")));
    }

    #[tokio::test]
    async fn classify_one_clamps_out_of_range_confidence() {
        let backend = MockBackend::new()
            .with_reply(r#"{"category": "bug_report", "confidence": 1.7}"#);
        let client = client_with(backend);

        let result = client.classify_one("text", &registry()).await.unwrap();
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn classify_one_propagates_backend_error() {
        let backend = MockBackend::new().with_failure("timeout");
        let client = client_with(backend);

        let err = client.classify_one("text", &registry()).await.unwrap_err();
        assert!(matches!(err, Error::Request(_)));
    }

    // ==========================================================================
    // Batch classification
    // ==========================================================================

    #[tokio::test]
    async fn classify_batch_places_results_by_index() {
        // Reply deliberately out of order
        let backend = MockBackend::new().with_reply(batch_reply(&[
            (2, "feature_request", 0.8),
            (1, "bug_report", 0.9),
        ]));
        let client = client_with(backend);

        let texts = vec!["it crashed".to_string(), "please add dark mode".to_string()];
        let results = client.classify_batch(&texts, &registry()).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].category, "bug_report");
        assert_eq!(results[1].category, "feature_request");
        assert!(results.iter().all(|r| r.method == ClassificationMethod::AiBatch));
    }

    #[tokio::test]
    async fn classify_batch_rejects_length_mismatch() {
        let backend = MockBackend::new().with_reply(batch_reply(&[(1, "bug_report", 0.9)]));
        let client = client_with(backend);

        let texts = vec!["a".to_string(), "b".to_string()];
        let err = client.classify_batch(&texts, &registry()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(msg) if msg.contains("expected 2")));
    }

    #[tokio::test]
    async fn classify_batch_rejects_out_of_range_index() {
        let backend = MockBackend::new().with_reply(batch_reply(&[
            (1, "bug_report", 0.9),
            (3, "bug_report", 0.9),
        ]));
        let client = client_with(backend);

        let texts = vec!["a".to_string(), "b".to_string()];
        let err = client.classify_batch(&texts, &registry()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(msg) if msg.contains("outside")));
    }

    #[tokio::test]
    async fn classify_batch_rejects_duplicate_index() {
        let backend = MockBackend::new().with_reply(batch_reply(&[
            (1, "bug_report", 0.9),
            (1, "feature_request", 0.8),
        ]));
        let client = client_with(backend);

        let texts = vec!["a".to_string(), "b".to_string()];
        let err = client.classify_batch(&texts, &registry()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(msg) if msg.contains("duplicate")));
    }

    #[tokio::test]
    async fn classify_batch_rejects_garbage() {
        let backend = MockBackend::new().with_reply("I cannot classify these items.");
        let client = client_with(backend);

        let texts = vec!["a".to_string()];
        let err = client.classify_batch(&texts, &registry()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn classify_batch_handles_fenced_reply() {
        let reply = format!("```json\n{}\n```", batch_reply(&[(1, "general_inquiry", 0.5)]));
        let backend = MockBackend::new().with_reply(reply);
        let client = client_with(backend);

        let texts = vec!["how do I export?".to_string()];
        let results = client.classify_batch(&texts, &registry()).await.unwrap();
        assert_eq!(results[0].category, "general_inquiry");
    }
}
