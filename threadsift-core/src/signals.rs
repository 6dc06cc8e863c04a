//! Line-level signal extraction and the rule-based brief.
//!
//! Signals are extracted per line, independent of message tags: one line may
//! land in several buckets, and each bucket keeps first-seen order with exact
//! duplicates dropped.

use crate::code::code_summary;
use crate::format::truncate_words;
use crate::llm::{refinement_prompt, TextCompletion};
use crate::types::{Message, Summary};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default word budget for the rule-based brief.
pub const DEFAULT_BRIEF_WORDS: usize = 180;

const DECISION_TOKENS: [&str; 5] = ["decide", "decision", "will", "choose", "set"];
const CONSTRAINT_TOKENS: [&str; 4] = ["must", "ensure", "require", "need to"];

/// Signal lines grouped by kind, in first-seen transcript order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signals {
    pub decisions: Vec<String>,
    pub actions: Vec<String>,
    pub open_questions: Vec<String>,
    pub constraints: Vec<String>,
}

impl Signals {
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
            && self.actions.is_empty()
            && self.open_questions.is_empty()
            && self.constraints.is_empty()
    }
}

/// Extract decision/action/question/constraint lines from all messages.
///
/// Blank lines are skipped. Matching is per line: a trailing `?` marks an
/// open question, a checkbox fragment or "todo" marks an action, and the
/// decision/constraint token lists match as case-insensitive substrings.
pub fn extract_signals(messages: &[Message]) -> Signals {
    let mut decisions = Vec::new();
    let mut actions = Vec::new();
    let mut open_questions = Vec::new();
    let mut constraints = Vec::new();

    for msg in messages {
        for line in nonempty_lines(&msg.content) {
            let lowered = line.to_lowercase();
            if line.ends_with('?') {
                open_questions.push(line.to_string());
            }
            if line.contains("- [") || lowered.contains("todo") {
                actions.push(line.to_string());
            }
            if DECISION_TOKENS.iter().any(|t| lowered.contains(t)) {
                decisions.push(line.to_string());
            }
            if CONSTRAINT_TOKENS.iter().any(|t| lowered.contains(t)) {
                constraints.push(line.to_string());
            }
        }
    }

    Signals {
        decisions: dedupe(decisions),
        actions: dedupe(actions),
        open_questions: dedupe(open_questions),
        constraints: dedupe(constraints),
    }
}

/// Compose the deterministic brief from extracted signals.
///
/// One line per non-empty signal bucket, prefixed with a context line when
/// the transcript has any content. The assembled text is word-truncated to
/// `max_brief_words`.
pub fn build_rule_based_brief(
    messages: &[Message],
    signals: &Signals,
    max_brief_words: usize,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    let context = first_nonempty_line(messages);
    if !context.is_empty() {
        lines.push(format!("Context: {}", context));
    }

    if !signals.decisions.is_empty() {
        lines.push(format!("Decisions: {}", signals.decisions.join("; ")));
    }
    if !signals.actions.is_empty() {
        lines.push(format!("Actions: {}", signals.actions.join("; ")));
    }
    if !signals.open_questions.is_empty() {
        lines.push(format!(
            "Open questions: {}",
            signals.open_questions.join("; ")
        ));
    }
    if !signals.constraints.is_empty() {
        lines.push(format!("Constraints: {}", signals.constraints.join("; ")));
    }

    if lines.is_empty() {
        lines.push(
            "Brief: Transcript contained no extractable signals; review raw messages.".to_string(),
        );
    }

    truncate_words(&lines.join("\n"), max_brief_words)
}

/// Assemble the full [`Summary`] record for a thread.
///
/// The brief is rule-based; when a refiner is supplied its output replaces
/// the brief, but any refinement failure or empty completion is absorbed and
/// the rule-based brief stands. The code summary is attached only when the
/// transcript contained at least one fenced block.
pub fn generate_summary(
    messages: &[Message],
    refiner: Option<&dyn TextCompletion>,
    max_brief_words: usize,
) -> Summary {
    let signals = extract_signals(messages);
    let mut brief = build_rule_based_brief(messages, &signals, max_brief_words);

    if let Some(refiner) = refiner {
        let prompt = refinement_prompt(messages, &signals, max_brief_words);
        match refiner.complete(&prompt) {
            Ok(refined) if !refined.is_empty() => brief = refined,
            Ok(_) => tracing::debug!("Empty refinement, keeping rule-based brief"),
            Err(e) => tracing::warn!(error = %e, "Refinement failed, keeping rule-based brief"),
        }
    }

    let code = code_summary(messages);
    Summary {
        brief,
        decisions: signals.decisions,
        actions: signals.actions,
        open_questions: signals.open_questions,
        constraints: signals.constraints,
        code_summary: (code.total_blocks > 0).then_some(code),
    }
}

fn first_nonempty_line(messages: &[Message]) -> String {
    for msg in messages {
        if let Some(line) = nonempty_lines(&msg.content).next() {
            return line.to_string();
        }
    }
    String::new()
}

fn nonempty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}
