//! Correction tracking and accuracy metrics.
//!
//! A read-mostly side channel: user corrections land in a capped ring
//! buffer and feed heuristic accuracy metrics. Nothing here may affect a
//! live classification run, so append failures are logged and swallowed.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, warn};

use triage_core::defaults;
use triage_core::{CorrectionRecord, Error};

/// Aggregate accuracy metrics over the retained correction history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyMetrics {
    pub total_feedback: usize,
    /// Fraction of corrections where the AI prediction was kept.
    pub accuracy: f32,
    pub average_confidence: f32,
    pub correct_predictions: usize,
    pub improvement_suggestions: Vec<String>,
}

impl AccuracyMetrics {
    fn empty() -> Self {
        Self {
            total_feedback: 0,
            accuracy: 0.0,
            average_confidence: 0.0,
            correct_predictions: 0,
            improvement_suggestions: Vec::new(),
        }
    }
}

/// Thread-safe capped correction history.
pub struct CorrectionTracker {
    capacity: usize,
    records: Mutex<VecDeque<CorrectionRecord>>,
}

impl CorrectionTracker {
    /// Create a tracker retaining at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a correction, evicting the oldest record at capacity.
    ///
    /// Never propagates failure; a poisoned lock is logged as a
    /// [`Error::CorrectionTracking`] and the record dropped.
    pub fn record_correction(&self, record: CorrectionRecord) {
        match self.records.lock() {
            Ok(mut records) => {
                if self.capacity == 0 {
                    return;
                }
                if records.len() == self.capacity {
                    records.pop_front();
                }
                records.push_back(record);
                debug!(
                    subsystem = "pipeline",
                    component = "metrics",
                    op = "record_correction",
                    retained = records.len(),
                    "Correction recorded"
                );
            }
            Err(poisoned) => {
                let err = Error::CorrectionTracking(format!(
                    "correction history lock poisoned: {poisoned}"
                ));
                warn!(
                    subsystem = "pipeline",
                    component = "metrics",
                    error = %err,
                    "Dropping correction record"
                );
            }
        }
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compute metrics over the retained history.
    pub fn metrics(&self) -> AccuracyMetrics {
        let records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if records.is_empty() {
            return AccuracyMetrics::empty();
        }

        let total = records.len();
        let correct = records.iter().filter(|r| r.was_correct).count();
        let accuracy = correct as f32 / total as f32;
        let average_confidence = records
            .iter()
            .map(|r| r.ai_confidence_at_prediction)
            .sum::<f32>()
            / total as f32;

        let mut suggestions = Vec::new();
        let incorrect: Vec<&CorrectionRecord> =
            records.iter().filter(|r| !r.was_correct).collect();
        if !incorrect.is_empty() {
            let low_confidence = incorrect
                .iter()
                .filter(|r| r.ai_confidence_at_prediction < defaults::LOW_CONFIDENCE_THRESHOLD)
                .count();
            if low_confidence as f32 / incorrect.len() as f32 > defaults::LOW_CONF_INCORRECT_RATIO
            {
                suggestions.push(
                    "Many misclassifications carry low confidence; refine keywords for the \
                     affected categories"
                        .to_string(),
                );
            }

            let high_confidence = incorrect
                .iter()
                .filter(|r| r.ai_confidence_at_prediction > defaults::HIGH_CONFIDENCE_THRESHOLD)
                .count();
            if high_confidence as f32 / incorrect.len() as f32
                > defaults::HIGH_CONF_INCORRECT_RATIO
            {
                suggestions.push(
                    "Confident predictions are being corrected; review category definitions for \
                     overlap"
                        .to_string(),
                );
            }
        }
        if average_confidence < defaults::AVG_CONFIDENCE_FLOOR {
            suggestions
                .push("Overall confidence is low; refine category keywords".to_string());
        }

        AccuracyMetrics {
            total_feedback: total,
            accuracy,
            average_confidence,
            correct_predictions: correct,
            improvement_suggestions: suggestions,
        }
    }
}

impl Default for CorrectionTracker {
    fn default() -> Self {
        Self::new(defaults::CORRECTION_HISTORY_CAP)
    }
}
