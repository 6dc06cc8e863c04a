//! Message importance scoring
//!
//! Deterministic heuristic scoring on a 0-10 scale. The score blends role,
//! tags, content length, acknowledgment detection, and question density, then
//! clamps. Scoring never reorders messages; ranking helpers sort copies.

use crate::types::{Message, Role, Tag};
use serde::{Deserialize, Serialize};

const ACKNOWLEDGMENTS: [&str; 14] = [
    "ok",
    "okay",
    "thanks",
    "thank you",
    "got it",
    "sounds good",
    "perfect",
    "great",
    "awesome",
    "yes",
    "no",
    "sure",
    "yep",
    "nope",
];

/// Score one message on the 0-10 importance scale.
///
/// Base 5.0, adjusted by role, tags (cumulative), content length, an exact
/// acknowledgment penalty, and a capped question bonus. The result is clamped
/// to [0.0, 10.0].
pub fn score_message(message: &Message) -> f64 {
    let mut score = 5.0;

    score += match message.role {
        Role::Assistant => 1.0,
        Role::User => 0.5,
        Role::System => 0.3,
        Role::Unknown => 0.0,
    };

    for tag in &message.tags {
        score += match tag {
            Tag::Code => 2.0,
            Tag::Decision => 1.5,
            Tag::Constraint => 1.2,
            Tag::Action => 1.0,
            Tag::Question => 0.8,
        };
    }

    // Length sweet spot is 100-500 chars; very short turns are penalized
    let len = message.content.chars().count();
    if len < 20 {
        score -= 2.0;
    } else if len < 50 {
        score -= 1.0;
    } else if (100..=500).contains(&len) {
        score += 1.0;
    } else if len > 1000 {
        score += 0.5;
    }

    let lowered = message.content.to_lowercase();
    let trimmed = lowered.trim();
    if ACKNOWLEDGMENTS.iter().any(|ack| *ack == trimmed) {
        score -= 3.0;
    }

    let question_count = message.content.matches('?').count();
    if question_count > 0 {
        score += (question_count as f64 * 0.3).min(1.5);
    }

    score.clamp(0.0, 10.0)
}

/// Score every message in place, storing the result on `importance_score`.
pub fn score_messages(messages: &mut [Message]) {
    for msg in messages.iter_mut() {
        msg.importance_score = score_message(msg);
    }
}

/// Rank messages by score, highest first. Ties keep document order.
pub fn rank_messages(messages: &[Message]) -> Vec<(&Message, f64)> {
    let mut ranked: Vec<(&Message, f64)> =
        messages.iter().map(|m| (m, score_message(m))).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

/// Filter to messages scoring at least `min_score`, optionally capped to the
/// `max_count` highest scorers, returned in document order.
pub fn filter_important(
    messages: &[Message],
    min_score: f64,
    max_count: Option<usize>,
) -> Vec<Message> {
    let ranked = rank_messages(messages);
    let mut important: Vec<Message> = ranked
        .into_iter()
        .filter(|(_, score)| *score >= min_score)
        .map(|(msg, _)| msg.clone())
        .collect();

    if let Some(cap) = max_count {
        important.truncate(cap);
    }

    important.sort_by_key(|m| m.order);
    important
}

/// Top `n` messages by score, returned in document order.
pub fn top_messages(messages: &[Message], n: usize) -> Vec<Message> {
    let ranked = rank_messages(messages);
    let mut top: Vec<Message> = ranked
        .into_iter()
        .take(n)
        .map(|(msg, _)| msg.clone())
        .collect();
    top.sort_by_key(|m| m.order);
    top
}

// ============================================
// Distribution statistics
// ============================================

/// Aggregate statistics over the importance scores of a thread.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportanceDistribution {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub high_importance: usize,
    pub medium_importance: usize,
    pub low_importance: usize,
}

/// Compute distribution statistics. All zeros for an empty slice.
///
/// Median is the upper-middle element of the sorted scores; mean and median
/// are rounded to two decimal places. High is >= 7.0, medium is [4.0, 7.0),
/// low is < 4.0.
pub fn importance_distribution(messages: &[Message]) -> ImportanceDistribution {
    if messages.is_empty() {
        return ImportanceDistribution::default();
    }

    let scores: Vec<f64> = messages.iter().map(score_message).collect();
    let mut sorted = scores.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let count = scores.len();
    let mean = scores.iter().sum::<f64>() / count as f64;
    let median = sorted[count / 2];

    ImportanceDistribution {
        count,
        min: sorted[0],
        max: sorted[count - 1],
        mean: round2(mean),
        median: round2(median),
        high_importance: scores.iter().filter(|s| **s >= 7.0).count(),
        medium_importance: scores.iter().filter(|s| **s >= 4.0 && **s < 7.0).count(),
        low_importance: scores.iter().filter(|s| **s < 4.0).count(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(order: u32, role: Role, content: &str, tags: &[Tag]) -> Message {
        let mut m = Message::new(order, role, content);
        m.tags = tags.to_vec();
        m
    }

    #[test]
    fn test_acknowledgment_scores_below_neutral() {
        let m = msg(1, Role::User, "ok", &[]);
        assert!(score_message(&m) < 5.0);
    }

    #[test]
    fn test_tagged_message_outscores_untagged() {
        let content = "We will add an index to speed this query up considerably now.";
        let plain = msg(1, Role::Assistant, content, &[]);
        let tagged = msg(2, Role::Assistant, content, &[Tag::Decision, Tag::Code]);
        assert!(score_message(&tagged) > score_message(&plain));
    }

    #[test]
    fn test_question_bonus_caps_at_one_and_a_half() {
        let base = "a".repeat(200);
        let few = msg(1, Role::User, &format!("{base}?"), &[]);
        let many = msg(2, Role::User, &format!("{base}??????????"), &[]);
        let diff = score_message(&many) - score_message(&few);
        assert!((diff - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_scores_clamped_to_scale() {
        let loaded = msg(
            1,
            Role::Assistant,
            &format!("{}???", "x".repeat(300)),
            &Tag::ALL.to_vec(),
        );
        assert!(score_message(&loaded) <= 10.0);

        let empty = msg(2, Role::Unknown, "no", &[]);
        assert!(score_message(&empty) >= 0.0);
    }

    #[test]
    fn test_score_messages_populates_scores() {
        let mut messages = vec![msg(1, Role::User, "ok", &[])];
        score_messages(&mut messages);
        assert_ne!(messages[0].importance_score, 5.0);
    }

    #[test]
    fn test_filter_important_returns_document_order() {
        let body = "x".repeat(200);
        let mut messages = vec![
            msg(1, Role::User, "ok", &[]),
            msg(2, Role::Assistant, &body, &[Tag::Code, Tag::Decision]),
            msg(3, Role::User, &body, &[Tag::Decision]),
            msg(4, Role::Assistant, &body, &[Tag::Code]),
        ];
        score_messages(&mut messages);

        let important = filter_important(&messages, 6.0, Some(2));
        assert_eq!(important.len(), 2);
        // Cap keeps the two highest scorers, then re-sorts by order
        assert!(important[0].order < important[1].order);
        assert!(important.iter().all(|m| score_message(m) >= 6.0));
    }

    #[test]
    fn test_distribution_empty() {
        let dist = importance_distribution(&[]);
        assert_eq!(dist.count, 0);
        assert_eq!(dist.mean, 0.0);
    }

    #[test]
    fn test_distribution_buckets() {
        let body = "x".repeat(200);
        let messages = vec![
            msg(1, Role::User, "ok", &[]),
            msg(2, Role::Assistant, &body, &[Tag::Code, Tag::Decision]),
            msg(3, Role::User, &body, &[]),
        ];
        let dist = importance_distribution(&messages);
        assert_eq!(dist.count, 3);
        assert_eq!(
            dist.high_importance + dist.medium_importance + dist.low_importance,
            3
        );
        assert!(dist.min <= dist.median && dist.median <= dist.max);
    }
}
