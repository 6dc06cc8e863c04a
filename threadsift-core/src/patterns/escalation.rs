//! Escalation detection over importance scores.
//!
//! Messages are split into consecutive windows and the per-window mean
//! importance is compared. A mostly-increasing window sequence with a
//! meaningful overall rise is reported as escalation.

use super::{Pattern, PatternDetector, PatternType};
use crate::types::Message;

const MIN_SCORED_MESSAGES: usize = 5;
const MIN_WINDOWS: usize = 3;
const MIN_TREND_STRENGTH: f64 = 0.6;
const MIN_PCT_INCREASE: f64 = 10.0;

pub struct EscalationDetector;

impl PatternDetector for EscalationDetector {
    fn name(&self) -> &'static str {
        "escalation"
    }

    fn detect(&self, messages: &[Message]) -> Vec<Pattern> {
        detect_escalation(messages).into_iter().collect()
    }
}

fn detect_escalation(messages: &[Message]) -> Option<Pattern> {
    let scored: Vec<&Message> = messages
        .iter()
        .filter(|m| m.importance_score > 0.0)
        .collect();
    if scored.len() < MIN_SCORED_MESSAGES {
        return None;
    }

    // Aim for four windows; the remainder forms a short trailing window
    let window_size = (scored.len() / 4).max(1);
    let windows: Vec<f64> = scored
        .chunks(window_size)
        .map(|w| w.iter().map(|m| m.importance_score).sum::<f64>() / w.len() as f64)
        .collect();
    if windows.len() < MIN_WINDOWS {
        return None;
    }

    let increases = windows.windows(2).filter(|w| w[1] > w[0]).count();
    let trend_strength = increases as f64 / (windows.len() - 1) as f64;
    if trend_strength < MIN_TREND_STRENGTH {
        return None;
    }

    let pct_increase = if windows[0] > 0.0 {
        (windows[windows.len() - 1] - windows[0]) / windows[0] * 100.0
    } else {
        0.0
    };
    if pct_increase < MIN_PCT_INCREASE {
        return None;
    }

    let description = format!(
        "Escalation pattern detected: Importance scores increasing by {:.1}% \
         over conversation. Trend strength: {}%.",
        pct_increase,
        (trend_strength * 100.0) as i64
    );

    Some(Pattern {
        pattern_type: PatternType::Escalation,
        description,
        frequency: windows.len(),
        confidence: trend_strength,
        first_occurrence: None,
        last_occurrence: None,
        evidence: Vec::new(),
    })
}
