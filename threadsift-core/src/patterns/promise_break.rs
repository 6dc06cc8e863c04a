//! Promise-break cycle detection.
//!
//! A promise-break cycle is a run of decisions that keep getting revised.
//! The detector reuses supersession tracking: each superseded decision is one
//! violation, and the cadence between violations drives the confidence.

use super::{Pattern, PatternDetector, PatternType};
use crate::format::{excerpt, parse_timestamp};
use crate::temporal::{detect_supersessions, extract_timeline};
use crate::types::Message;
use chrono::{DateTime, Utc};

/// Minimum superseded decisions, and minimum parseable timestamps among them.
const MIN_VIOLATIONS: usize = 3;

pub struct PromiseBreakDetector;

impl PatternDetector for PromiseBreakDetector {
    fn name(&self) -> &'static str {
        "promise_break"
    }

    fn detect(&self, messages: &[Message]) -> Vec<Pattern> {
        detect_promise_break_cycle(messages).into_iter().collect()
    }
}

fn detect_promise_break_cycle(messages: &[Message]) -> Option<Pattern> {
    let mut events = extract_timeline(messages);
    detect_supersessions(&mut events, messages);

    let superseded: Vec<_> = events.iter().filter(|e| !e.is_current()).collect();
    if superseded.len() < MIN_VIOLATIONS {
        return None;
    }

    let mut timestamps: Vec<DateTime<Utc>> = superseded
        .iter()
        .filter_map(|e| e.timestamp.as_deref())
        .filter_map(parse_timestamp)
        .collect();
    if timestamps.len() < MIN_VIOLATIONS {
        return None;
    }
    timestamps.sort();

    // Cadence in whole days; zero-day gaps carry no timing signal
    let gaps: Vec<i64> = timestamps
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .filter(|d| *d > 0)
        .collect();
    if gaps.is_empty() {
        return None;
    }

    let avg_days = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;

    let evidence: Vec<String> = superseded
        .iter()
        .take(5)
        .map(|e| format!("{}...", excerpt(&e.content, 100)))
        .collect();

    // Consistent cadence raises confidence
    let confidence = if gaps.len() > 1 {
        let variance = gaps
            .iter()
            .map(|d| (*d as f64 - avg_days).powi(2))
            .sum::<f64>()
            / gaps.len() as f64;
        let std_dev = variance.sqrt();
        (1.0 - std_dev / avg_days).clamp(0.70, 0.98)
    } else {
        0.75
    };

    let span_days = (timestamps[timestamps.len() - 1] - timestamps[0]).num_days();
    let description = format!(
        "Promise-break cycle detected: {} instances over {} days. \
         Average {:.1} days between violations. {}% confidence.",
        superseded.len(),
        span_days,
        avg_days,
        (confidence * 100.0) as i64
    );

    Some(Pattern {
        pattern_type: PatternType::PromiseBreakCycle,
        description,
        frequency: superseded.len(),
        confidence,
        first_occurrence: timestamps.first().copied(),
        last_occurrence: timestamps.last().copied(),
        evidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, Tag};

    fn decision(order: u32, content: &str, timestamp: Option<&str>) -> Message {
        let mut m = Message::new(order, Role::User, content);
        m.tags = vec![Tag::Decision];
        m.timestamp = timestamp.map(str::to_string);
        m
    }

    fn broken_promises(n: usize) -> Vec<Message> {
        // Each revision supersedes the previous decision, five days apart
        (0..=n)
            .map(|i| {
                let day = 1 + i * 5;
                decision(
                    (i + 1) as u32,
                    &format!("Actually, new plan: we will do step {i}"),
                    Some(&format!("2026-01-{:02}T00:00:00", day)),
                )
            })
            .collect()
    }

    #[test]
    fn test_below_threshold_yields_nothing() {
        let messages = broken_promises(2);
        assert!(detect_promise_break_cycle(&messages).is_none());
    }

    #[test]
    fn test_cycle_detected_with_confidence_in_range() {
        let messages = broken_promises(4);
        let pattern = detect_promise_break_cycle(&messages).unwrap();
        assert_eq!(pattern.pattern_type, PatternType::PromiseBreakCycle);
        assert_eq!(pattern.frequency, 4);
        assert!((0.70..=0.98).contains(&pattern.confidence));
        assert!(pattern.description.contains("4 instances"));
        assert!(!pattern.evidence.is_empty());
        assert!(pattern.evidence.len() <= 5);
    }

    #[test]
    fn test_perfectly_regular_cadence_is_high_confidence() {
        let messages = broken_promises(5);
        let pattern = detect_promise_break_cycle(&messages).unwrap();
        assert!((pattern.confidence - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_missing_timestamps_yield_nothing() {
        let messages: Vec<Message> = (1..=5)
            .map(|i| decision(i, "Actually, new plan: we will revise", None))
            .collect();
        assert!(detect_promise_break_cycle(&messages).is_none());
    }

    #[test]
    fn test_same_day_violations_yield_nothing() {
        let messages: Vec<Message> = (1..=5)
            .map(|i| {
                decision(
                    i,
                    "Actually, new plan: we will revise",
                    Some("2026-01-04T00:00:00"),
                )
            })
            .collect();
        assert!(detect_promise_break_cycle(&messages).is_none());
    }
}
