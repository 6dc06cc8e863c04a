//! Timeline extraction, supersession tracking, and phase segmentation.
//!
//! The timeline is a flat event list in document order. Supersession is
//! decision-only: a later decision carrying a revision keyword supersedes an
//! earlier one, and the first qualifying later decision wins.

use crate::format::excerpt;
use crate::types::{Message, Tag};
use serde::{Deserialize, Serialize};

const SUPERSESSION_KEYWORDS: [&str; 10] = [
    "actually",
    "instead",
    "changed my mind",
    "let's use",
    "switch to",
    "no wait",
    "correction",
    "update:",
    "revised",
    "new plan",
];

// Event emission order within one message
const EVENT_TAGS: [Tag; 4] = [Tag::Decision, Tag::Action, Tag::Question, Tag::Code];

/// One significant event on the conversation timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Order of the message this event came from
    pub message_order: u32,
    /// Which tag produced this event
    pub event_type: Tag,
    /// Content excerpt (code events carry a fixed placeholder)
    pub content: String,
    /// Timestamp inherited from the source message
    pub timestamp: Option<String>,
    /// Order of the decision that superseded this one, if any
    pub superseded_by: Option<u32>,
}

impl TimelineEvent {
    fn new(msg: &Message, event_type: Tag, content: String) -> Self {
        Self {
            message_order: msg.order,
            event_type,
            content,
            timestamp: msg.timestamp.clone(),
            superseded_by: None,
        }
    }

    /// An event is current until a later decision supersedes it.
    pub fn is_current(&self) -> bool {
        self.superseded_by.is_none()
    }
}

/// Build the timeline from tagged messages.
///
/// Each tagged message emits one event per matching tag, in decision, action,
/// question, code order. Content is truncated to 200 characters; code events
/// carry a placeholder instead of the block text.
pub fn extract_timeline(messages: &[Message]) -> Vec<TimelineEvent> {
    let mut events = Vec::new();

    for msg in messages {
        for tag in EVENT_TAGS {
            if !msg.has_tag(tag) {
                continue;
            }
            let content = if tag == Tag::Code {
                "Code block added".to_string()
            } else {
                excerpt(&msg.content, 200)
            };
            events.push(TimelineEvent::new(msg, tag, content));
        }
    }

    events
}

/// Mark superseded decisions in place.
///
/// For each decision event, scan later decision events in order; the first
/// whose source message contains a supersession keyword (case-insensitive)
/// marks the earlier event superseded. Non-decision events are never marked.
pub fn detect_supersessions(events: &mut [TimelineEvent], messages: &[Message]) {
    let decision_indices: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.event_type == Tag::Decision)
        .map(|(i, _)| i)
        .collect();

    for (pos, &i) in decision_indices.iter().enumerate() {
        for &j in &decision_indices[pos + 1..] {
            let later_order = events[j].message_order;
            let Some(later_msg) = messages.iter().find(|m| m.order == later_order) else {
                continue;
            };
            let lowered = later_msg.content.to_lowercase();
            if SUPERSESSION_KEYWORDS.iter().any(|k| lowered.contains(k)) {
                events[i].superseded_by = Some(later_order);
                break;
            }
        }
    }
}

/// Current (non-superseded) events grouped by kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CurrentState {
    pub decisions: Vec<TimelineEvent>,
    pub actions: Vec<TimelineEvent>,
    pub questions: Vec<TimelineEvent>,
    pub code_events: Vec<TimelineEvent>,
}

/// Group the still-current events by kind.
pub fn current_state(events: &[TimelineEvent]) -> CurrentState {
    let mut state = CurrentState::default();
    for event in events.iter().filter(|e| e.is_current()) {
        match event.event_type {
            Tag::Decision => state.decisions.push(event.clone()),
            Tag::Action => state.actions.push(event.clone()),
            Tag::Question => state.questions.push(event.clone()),
            Tag::Code => state.code_events.push(event.clone()),
            Tag::Constraint => {}
        }
    }
    state
}

/// Events that were superseded, in timeline order.
pub fn historical_changes(events: &[TimelineEvent]) -> Vec<&TimelineEvent> {
    events.iter().filter(|e| !e.is_current()).collect()
}

/// Render a markdown timeline report with supersession markers.
pub fn render_timeline(events: &[TimelineEvent]) -> String {
    if events.is_empty() {
        return "No significant events in timeline.".to_string();
    }

    let mut lines = vec!["# Conversation Timeline\n".to_string()];

    let decisions: Vec<&TimelineEvent> = events
        .iter()
        .filter(|e| e.event_type == Tag::Decision)
        .collect();
    if !decisions.is_empty() {
        lines.push("## Decisions\n".to_string());
        for event in &decisions {
            let status = match event.superseded_by {
                None => "✓ CURRENT".to_string(),
                Some(order) => format!("⨯ Superseded by #{}", order),
            };
            lines.push(format!("- **#{}** {}", event.message_order, status));
            lines.push(format!("  {}...", excerpt(&event.content, 100)));
        }
        lines.push(String::new());
    }

    let actions: Vec<&TimelineEvent> = events
        .iter()
        .filter(|e| e.event_type == Tag::Action)
        .collect();
    if !actions.is_empty() {
        lines.push("## Actions\n".to_string());
        for event in &actions {
            let status = if event.is_current() { "[ ]" } else { "[x]" };
            lines.push(format!(
                "- {} **#{}** {}...",
                status,
                event.message_order,
                excerpt(&event.content, 100)
            ));
        }
        lines.push(String::new());
    }

    let open_questions: Vec<&TimelineEvent> = events
        .iter()
        .filter(|e| e.event_type == Tag::Question && e.is_current())
        .collect();
    if events.iter().any(|e| e.event_type == Tag::Question) {
        lines.push("## Questions\n".to_string());
        if !open_questions.is_empty() {
            lines.push("**Still open:**".to_string());
            for event in &open_questions {
                lines.push(format!(
                    "- **#{}** {}...",
                    event.message_order,
                    excerpt(&event.content, 100)
                ));
            }
        }
        lines.push(String::new());
    }

    let code_count = events.iter().filter(|e| e.event_type == Tag::Code).count();
    if code_count > 0 {
        lines.push("## Code Activity\n".to_string());
        lines.push(format!("Total code blocks added: {}", code_count));
        lines.push(String::new());
    }

    lines.join("\n")
}

// ============================================
// Phase segmentation
// ============================================

/// Coarse conversational phase label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Planning,
    Implementation,
    Discussion,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Planning => "planning",
            PhaseKind::Implementation => "implementation",
            PhaseKind::Discussion => "discussion",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One contiguous run of same-labelled messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPhase {
    pub kind: PhaseKind,
    /// Index of the first message in the phase (0-based)
    pub start: usize,
    /// Index of the last message in the phase (0-based, inclusive)
    pub end: usize,
    pub message_count: usize,
}

/// Segment messages into contiguous phases.
///
/// Each message is labelled planning (question or decision tag),
/// implementation (code tag), or discussion; planning wins when both apply.
/// A new phase opens whenever the label changes, so phases partition the
/// message list exactly.
pub fn conversation_phases(messages: &[Message]) -> Vec<ConversationPhase> {
    let mut phases = Vec::new();
    let mut current: Option<(PhaseKind, usize)> = None;

    for (i, msg) in messages.iter().enumerate() {
        let label = if msg.has_tag(Tag::Question) || msg.has_tag(Tag::Decision) {
            PhaseKind::Planning
        } else if msg.has_tag(Tag::Code) {
            PhaseKind::Implementation
        } else {
            PhaseKind::Discussion
        };

        match current {
            Some((kind, _)) if kind == label => {}
            Some((kind, start)) => {
                phases.push(ConversationPhase {
                    kind,
                    start,
                    end: i - 1,
                    message_count: i - start,
                });
                current = Some((label, i));
            }
            None => current = Some((label, i)),
        }
    }

    if let Some((kind, start)) = current {
        phases.push(ConversationPhase {
            kind,
            start,
            end: messages.len() - 1,
            message_count: messages.len() - start,
        });
    }

    phases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn msg(order: u32, content: &str, tags: &[Tag]) -> Message {
        let mut m = Message::new(order, Role::User, content);
        m.tags = tags.to_vec();
        m
    }

    #[test]
    fn test_timeline_event_order_within_message() {
        let messages = [msg(1, "everything", &[Tag::Code, Tag::Question, Tag::Action, Tag::Decision])];
        let events = extract_timeline(&messages);
        let kinds: Vec<Tag> = events.iter().map(|e| e.event_type).collect();
        assert_eq!(kinds, vec![Tag::Decision, Tag::Action, Tag::Question, Tag::Code]);
    }

    #[test]
    fn test_code_event_uses_placeholder() {
        let messages = [msg(1, "```rust\nfn main() {}\n```", &[Tag::Code])];
        let events = extract_timeline(&messages);
        assert_eq!(events[0].content, "Code block added");
    }

    #[test]
    fn test_untagged_messages_emit_no_events() {
        let messages = [msg(1, "plain chatter", &[])];
        assert!(extract_timeline(&messages).is_empty());
    }

    #[test]
    fn test_first_supersessor_wins() {
        let messages = [
            msg(1, "We will use Postgres", &[Tag::Decision]),
            msg(2, "Actually, let's use SQLite, we decide that", &[Tag::Decision]),
            msg(3, "No wait, we will choose MySQL", &[Tag::Decision]),
        ];
        let mut events = extract_timeline(&messages);
        detect_supersessions(&mut events, &messages);

        assert_eq!(events[0].superseded_by, Some(2));
        assert_eq!(events[1].superseded_by, Some(3));
        assert!(events[2].is_current());
    }

    #[test]
    fn test_later_decision_without_keyword_does_not_supersede() {
        let messages = [
            msg(1, "We will use Postgres", &[Tag::Decision]),
            msg(2, "We will also decide on caching later", &[Tag::Decision]),
        ];
        let mut events = extract_timeline(&messages);
        detect_supersessions(&mut events, &messages);
        assert!(events[0].is_current());
    }

    #[test]
    fn test_non_decisions_never_superseded() {
        let messages = [
            msg(1, "- [ ] draft schema", &[Tag::Action]),
            msg(2, "Actually, instead we will switch to a new plan", &[Tag::Decision]),
        ];
        let mut events = extract_timeline(&messages);
        detect_supersessions(&mut events, &messages);
        assert!(events[0].is_current());
    }

    #[test]
    fn test_current_state_excludes_superseded() {
        let messages = [
            msg(1, "We will use Postgres", &[Tag::Decision]),
            msg(2, "Actually let's use SQLite, decision made", &[Tag::Decision]),
        ];
        let mut events = extract_timeline(&messages);
        detect_supersessions(&mut events, &messages);
        let state = current_state(&events);
        assert_eq!(state.decisions.len(), 1);
        assert_eq!(state.decisions[0].message_order, 2);
        assert_eq!(historical_changes(&events).len(), 1);
    }

    #[test]
    fn test_render_timeline_empty() {
        assert_eq!(render_timeline(&[]), "No significant events in timeline.");
    }

    #[test]
    fn test_phases_partition_messages() {
        let messages = [
            msg(1, "what should we build?", &[Tag::Question]),
            msg(2, "```code```", &[Tag::Code]),
            msg(3, "nice", &[]),
            msg(4, "more chatter", &[]),
            msg(5, "should we refactor?", &[Tag::Question]),
        ];
        let phases = conversation_phases(&messages);
        assert_eq!(phases.len(), 4);
        assert_eq!(phases[0].kind, PhaseKind::Planning);
        assert_eq!(phases[1].kind, PhaseKind::Implementation);
        assert_eq!(phases[2].kind, PhaseKind::Discussion);
        assert_eq!(phases[2].message_count, 2);
        assert_eq!(phases[3].kind, PhaseKind::Planning);

        let total: usize = phases.iter().map(|p| p.message_count).sum();
        assert_eq!(total, messages.len());
        assert_eq!(phases[0].start, 0);
        assert_eq!(phases.last().unwrap().end, messages.len() - 1);
    }

    #[test]
    fn test_planning_wins_over_implementation() {
        let messages = [msg(1, "code and question?", &[Tag::Code, Tag::Question])];
        let phases = conversation_phases(&messages);
        assert_eq!(phases[0].kind, PhaseKind::Planning);
    }

    #[test]
    fn test_phases_empty_input() {
        assert!(conversation_phases(&[]).is_empty());
    }
}
