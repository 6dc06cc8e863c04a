//! Recurring topic detection.
//!
//! A tag that appears often AND spreads across most of the conversation is a
//! recurring topic. The span test filters out clusters: five code blocks in a
//! row at the end of a long thread is a burst, not a topic.

use super::{Pattern, PatternDetector, PatternType};
use crate::types::{Message, Tag};

const MIN_OCCURRENCES: usize = 5;

pub struct RecurringTopicDetector;

impl PatternDetector for RecurringTopicDetector {
    fn name(&self) -> &'static str {
        "recurring_topic"
    }

    fn detect(&self, messages: &[Message]) -> Vec<Pattern> {
        detect_recurring_topics(messages)
    }
}

fn detect_recurring_topics(messages: &[Message]) -> Vec<Pattern> {
    let total = messages.len();
    let mut patterns = Vec::new();

    for tag in Tag::ALL {
        let orders: Vec<u32> = messages
            .iter()
            .filter(|m| m.has_tag(tag))
            .map(|m| m.order)
            .collect();
        if orders.len() < MIN_OCCURRENCES {
            continue;
        }

        let min = orders.iter().min().copied().unwrap_or(0);
        let max = orders.iter().max().copied().unwrap_or(0);
        let span = max - min;

        if f64::from(span) <= total as f64 * 0.5 {
            continue;
        }

        let confidence = (0.70 + orders.len() as f64 / total as f64).min(0.95);
        let description = format!(
            "Recurring topic: '{}' appears {} times throughout conversation. \
             Spans {} messages.",
            tag,
            orders.len(),
            span
        );

        patterns.push(Pattern {
            pattern_type: PatternType::RecurringTopic,
            description,
            frequency: orders.len(),
            confidence,
            first_occurrence: None,
            last_occurrence: None,
            evidence: vec![tag.as_str().to_string()],
        });
    }

    patterns
}
