//! Day-of-week timing detection.
//!
//! Looks at timestamped decision and constraint messages and reports when a
//! majority of them fall on the same weekday.

use super::{Pattern, PatternDetector, PatternType};
use crate::format::parse_timestamp;
use crate::types::{Message, Tag};
use chrono::Datelike;

const MIN_TIMESTAMPS: usize = 5;
const MIN_PERCENTAGE: f64 = 50.0;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub struct TimingDetector;

impl PatternDetector for TimingDetector {
    fn name(&self) -> &'static str {
        "timing"
    }

    fn detect(&self, messages: &[Message]) -> Vec<Pattern> {
        detect_timing_pattern(messages).into_iter().collect()
    }
}

fn detect_timing_pattern(messages: &[Message]) -> Option<Pattern> {
    let weekdays: Vec<usize> = messages
        .iter()
        .filter(|m| m.has_tag(Tag::Decision) || m.has_tag(Tag::Constraint))
        .filter_map(|m| m.timestamp.as_deref())
        .filter_map(parse_timestamp)
        .map(|dt| dt.weekday().num_days_from_monday() as usize)
        .collect();
    if weekdays.len() < MIN_TIMESTAMPS {
        return None;
    }

    let mut counts = [0usize; 7];
    for day in &weekdays {
        counts[*day] += 1;
    }

    // Plurality day; ties resolve to the earliest weekday
    let (most_common_day, count) = counts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;

    let percentage = *count as f64 / weekdays.len() as f64 * 100.0;
    if percentage < MIN_PERCENTAGE {
        return None;
    }

    let day_name = DAY_NAMES[most_common_day];
    let confidence = (percentage / 100.0).min(0.95);
    let description = format!(
        "Timing pattern detected: {:.0}% of events occur on {}. \
         Statistical significance suggests intentional timing.",
        percentage, day_name
    );

    Some(Pattern {
        pattern_type: PatternType::TimingPattern,
        description,
        frequency: *count,
        confidence,
        first_occurrence: None,
        last_occurrence: None,
        evidence: vec![day_name.to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn decision_on(order: u32, date: &str) -> Message {
        let mut m = Message::new(order, Role::User, "we will decide");
        m.tags = vec![Tag::Decision];
        m.timestamp = Some(format!("{date}T00:00:00"));
        m
    }

    #[test]
    fn test_monday_clustering_detected() {
        // Four Mondays and one Wednesday in January 2026
        let dates = ["2026-01-05", "2026-01-12", "2026-01-19", "2026-01-26", "2026-01-07"];
        let messages: Vec<Message> = dates
            .iter()
            .enumerate()
            .map(|(i, d)| decision_on(i as u32 + 1, d))
            .collect();

        let pattern = detect_timing_pattern(&messages).unwrap();
        assert_eq!(pattern.evidence, vec!["Monday"]);
        assert_eq!(pattern.frequency, 4);
        assert!((pattern.confidence - 0.80).abs() < 1e-9);
    }

    #[test]
    fn test_spread_across_week_yields_nothing() {
        // Seven consecutive days, one decision each
        let messages: Vec<Message> = (5..=11)
            .map(|day| decision_on(day as u32, &format!("2026-01-{:02}", day)))
            .collect();
        assert!(detect_timing_pattern(&messages).is_none());
    }

    #[test]
    fn test_too_few_timestamps_yield_nothing() {
        let messages: Vec<Message> = (0..3)
            .map(|i| decision_on(i + 1, "2026-01-05"))
            .collect();
        assert!(detect_timing_pattern(&messages).is_none());
    }

    #[test]
    fn test_untagged_timestamps_ignored() {
        let mut messages: Vec<Message> = (0..6)
            .map(|i| {
                let mut m = Message::new(i + 1, Role::User, "plain");
                m.timestamp = Some("2026-01-05T00:00:00".to_string());
                m
            })
            .collect();
        // Tags stripped, so nothing qualifies
        for m in &mut messages {
            m.tags.clear();
        }
        assert!(detect_timing_pattern(&messages).is_none());
    }

    #[test]
    fn test_confidence_caps_below_one() {
        let messages: Vec<Message> = (0..5)
            .map(|i| decision_on(i + 1, "2026-01-05"))
            .collect();
        let pattern = detect_timing_pattern(&messages).unwrap();
        assert_eq!(pattern.confidence, 0.95);
    }
}
