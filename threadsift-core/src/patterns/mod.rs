//! Behavioral pattern detection
//!
//! Each detector is a small plugin implementing [`PatternDetector`].
//! Detectors are conservative: below their minimum-data thresholds they
//! return nothing rather than a low-confidence guess. [`detect_all`] runs the
//! default set and returns the combined results ordered by confidence.

mod escalation;
mod promise_break;
mod recurring_topic;
mod timing;

pub use escalation::EscalationDetector;
pub use promise_break::PromiseBreakDetector;
pub use recurring_topic::RecurringTopicDetector;
pub use timing::TimingDetector;

use crate::types::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================
// Pattern type and detector trait
// ============================================

/// Kind of detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    PromiseBreakCycle,
    Escalation,
    RecurringTopic,
    TimingPattern,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::PromiseBreakCycle => "promise_break_cycle",
            PatternType::Escalation => "escalation",
            PatternType::RecurringTopic => "recurring_topic",
            PatternType::TimingPattern => "timing_pattern",
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected behavioral pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub pattern_type: PatternType,
    /// Human-readable description with embedded statistics
    pub description: String,
    /// How many observations back the pattern
    pub frequency: usize,
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
    pub first_occurrence: Option<DateTime<Utc>>,
    pub last_occurrence: Option<DateTime<Utc>>,
    /// Supporting excerpts or labels
    #[serde(default)]
    pub evidence: Vec<String>,
}

/// A pluggable pattern detector.
///
/// Implementations must be pure over their input: same messages, same
/// patterns, in the same order.
pub trait PatternDetector {
    /// Stable detector name for logging.
    fn name(&self) -> &'static str;

    /// Detect zero or more patterns in the message list.
    fn detect(&self, messages: &[Message]) -> Vec<Pattern>;
}

/// The default detector set, in registration order.
pub fn default_detectors() -> Vec<Box<dyn PatternDetector>> {
    vec![
        Box::new(PromiseBreakDetector),
        Box::new(EscalationDetector),
        Box::new(RecurringTopicDetector),
        Box::new(TimingDetector),
    ]
}

/// Run all default detectors and return their patterns ordered by confidence,
/// highest first. The sort is stable, so equal-confidence patterns keep
/// registration order.
pub fn detect_all(messages: &[Message]) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    for detector in default_detectors() {
        let found = detector.detect(messages);
        tracing::debug!(detector = detector.name(), patterns = found.len(), "Detector ran");
        patterns.extend(found);
    }

    patterns.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    patterns
}

// ============================================
// Summary statistics
// ============================================

/// Aggregate statistics over a set of detected patterns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternSummary {
    pub total_patterns: usize,
    pub by_type: BTreeMap<&'static str, usize>,
    pub highest_confidence: f64,
    pub average_confidence: f64,
}

/// Summarize detected patterns. All zeros for an empty slice.
pub fn pattern_summary(patterns: &[Pattern]) -> PatternSummary {
    if patterns.is_empty() {
        return PatternSummary::default();
    }

    let mut by_type = BTreeMap::new();
    for p in patterns {
        *by_type.entry(p.pattern_type.as_str()).or_insert(0) += 1;
    }

    let confidences: Vec<f64> = patterns.iter().map(|p| p.confidence).collect();
    let highest = confidences.iter().cloned().fold(f64::MIN, f64::max);
    let average = confidences.iter().sum::<f64>() / confidences.len() as f64;

    PatternSummary {
        total_patterns: patterns.len(),
        by_type,
        highest_confidence: highest,
        average_confidence: average,
    }
}
