//! End-to-end pipeline tests: parse, score, extract, detect, assemble.

use threadsift_core::importance::{filter_important, score_messages};
use threadsift_core::parser::{infer_title, parse_transcript};
use threadsift_core::patterns::{
    detect_all, EscalationDetector, PatternDetector, PatternType, PromiseBreakDetector,
    TimingDetector,
};
use threadsift_core::signals::{extract_signals, generate_summary, DEFAULT_BRIEF_WORDS};
use threadsift_core::temporal::{detect_supersessions, extract_timeline};
use threadsift_core::{logging, Message, Role, Tag, ThreadDigest, ThreadMetadata};

const TRANSCRIPT: &str = "\
January 4, 2026

## You said:
We need to pick a database. Should we use Postgres or SQLite?

## ChatGPT said:
We will choose Postgres. It must handle concurrent writers.

## You said:
Actually, let's use SQLite instead. We decide to keep deployment simple.

- [ ] update the config

## ChatGPT said:
Here is the change for config.rs:
```rust
const DB: &str = \"sqlite://app.db\";
```
";

fn digest(text: &str, filename: Option<&str>) -> ThreadDigest {
    let mut messages = parse_transcript(text, filename);
    score_messages(&mut messages);
    let summary = generate_summary(&messages, None, DEFAULT_BRIEF_WORDS);

    let mut thread = ThreadMetadata::new("thread-1");
    thread.title = Some(infer_title(&messages));
    thread.source_file = filename.map(str::to_string);

    ThreadDigest {
        thread,
        messages,
        summary,
    }
}

#[test]
fn parse_round_trip_two_messages() {
    let messages = parse_transcript("User:\nHello\nAssistant:\nHi there", None);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].order, 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Hello");
    assert_eq!(messages[1].order, 2);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Hi there");
}

#[test]
fn orders_are_gapless_from_one() {
    logging::init_test();
    let d = digest(TRANSCRIPT, Some("chat-01042026.md"));
    for (i, msg) in d.messages.iter().enumerate() {
        assert_eq!(msg.order, i as u32 + 1);
    }
}

#[test]
fn full_pipeline_produces_expected_signals() {
    let d = digest(TRANSCRIPT, Some("chat-01042026.md"));

    assert!(d.summary.brief.starts_with("Context:"));
    assert!(d.summary.decisions.iter().any(|s| s.contains("Postgres")));
    assert!(d
        .summary
        .actions
        .iter()
        .any(|s| s.contains("update the config")));
    assert!(d
        .summary
        .open_questions
        .iter()
        .any(|s| s.ends_with('?')));
    assert!(d
        .summary
        .constraints
        .iter()
        .any(|s| s.contains("must handle")));

    let code = d.summary.code_summary.as_ref().unwrap();
    assert_eq!(code.total_blocks, 1);
    assert_eq!(code.languages["rust"], 1);
}

#[test]
fn date_marker_stamps_messages() {
    let d = digest(TRANSCRIPT, None);
    assert!(d
        .messages
        .iter()
        .all(|m| m.timestamp.as_deref() == Some("2026-01-04T00:00:00")));
}

#[test]
fn title_comes_from_first_user_message() {
    let d = digest(TRANSCRIPT, None);
    assert!(d.thread.title.as_deref().unwrap().starts_with("We need to pick a database"));
}

#[test]
fn digest_serializes_and_deserializes() {
    let d = digest(TRANSCRIPT, Some("chat-01042026.md"));
    let json = serde_json::to_string_pretty(&d).unwrap();
    let back: ThreadDigest = serde_json::from_str(&json).unwrap();
    assert_eq!(back.messages.len(), d.messages.len());
    assert_eq!(back.summary.brief, d.summary.brief);
    assert_eq!(back.thread.schema_version, 1);
}

#[test]
fn acknowledgment_scores_below_neutral() {
    let mut messages = parse_transcript("User:\nok", None);
    score_messages(&mut messages);
    assert!(messages[0].importance_score < 5.0);
}

#[test]
fn tagged_content_outscores_untagged() {
    let content = "We will migrate the database schema before the deadline hits us.";
    let mut tagged = Message::new(1, Role::User, content);
    tagged.tags = vec![Tag::Code, Tag::Decision];
    let untagged = Message::new(2, Role::User, content);

    assert!(
        threadsift_core::importance::score_message(&tagged)
            > threadsift_core::importance::score_message(&untagged)
    );
}

#[test]
fn filter_important_caps_and_reorders() {
    let mut messages = parse_transcript(TRANSCRIPT, None);
    score_messages(&mut messages);
    let important = filter_important(&messages, 6.0, Some(2));
    assert!(important.len() <= 2);
    assert!(important.windows(2).all(|w| w[0].order < w[1].order));
    assert!(important.iter().all(|m| m.importance_score >= 6.0));
}

#[test]
fn supersession_marks_first_qualifying_decision() {
    let messages = parse_transcript(TRANSCRIPT, None);
    let mut events = extract_timeline(&messages);
    detect_supersessions(&mut events, &messages);

    let decisions: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == Tag::Decision)
        .collect();
    // The Postgres decision is superseded by the SQLite revision
    assert_eq!(decisions[0].superseded_by, Some(3));
    assert!(decisions.last().unwrap().is_current());
}

#[test]
fn promise_break_needs_three_superseded_events() {
    let messages = parse_transcript(TRANSCRIPT, Some("chat-01042026.md"));
    let patterns = PromiseBreakDetector.detect(&messages);
    assert!(patterns.is_empty());
}

#[test]
fn promise_break_confidence_within_bounds() {
    let mut text = String::new();
    for day in [2, 9, 16, 23, 28] {
        text.push_str(&format!(
            "1/{day}/26\nUser:\nActually, new plan: we will pick option {day}\n"
        ));
    }
    let messages = parse_transcript(&text, None);
    let patterns = PromiseBreakDetector.detect(&messages);
    assert_eq!(patterns.len(), 1);
    assert!((0.70..=0.98).contains(&patterns[0].confidence));
    assert_eq!(patterns[0].pattern_type, PatternType::PromiseBreakCycle);
}

#[test]
fn escalation_detected_on_linear_climb() {
    let messages: Vec<Message> = (0..10)
        .map(|i| {
            let mut m = Message::new(i as u32 + 1, Role::User, "content");
            m.importance_score = 5.0 + i as f64 * 0.5;
            m
        })
        .collect();
    let patterns = EscalationDetector.detect(&messages);
    assert_eq!(patterns.len(), 1);
    assert!(patterns[0].confidence > 0.6);
}

#[test]
fn timing_null_when_days_spread_across_week() {
    // Seven decisions, one per weekday
    let messages: Vec<Message> = (5..=11)
        .map(|day| {
            let mut m = Message::new(day as u32, Role::User, "we will decide");
            m.tags = vec![Tag::Decision];
            m.timestamp = Some(format!("2026-01-{day:02}T00:00:00"));
            m
        })
        .collect();
    assert!(TimingDetector.detect(&messages).is_empty());
}

#[test]
fn detect_all_orders_by_confidence() {
    let mut text = String::new();
    for day in [2, 9, 16, 23, 28] {
        text.push_str(&format!(
            "1/{day}/26\nUser:\nActually, new plan: we will pick option {day}\n"
        ));
    }
    let mut messages = parse_transcript(&text, None);
    score_messages(&mut messages);

    let patterns = detect_all(&messages);
    assert!(!patterns.is_empty());
    assert!(patterns
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence));
}

#[test]
fn empty_transcript_degrades_to_fallback_brief() {
    let d = digest("no speaker markers here at all", None);
    assert!(d.messages.is_empty());
    assert_eq!(
        d.summary.brief,
        "Brief: Transcript contained no extractable signals; review raw messages."
    );
    assert_eq!(d.thread.title.as_deref(), Some("Untitled Thread"));
}

#[test]
fn signal_extraction_matches_summary_lists() {
    let messages = parse_transcript(TRANSCRIPT, None);
    let signals = extract_signals(&messages);
    let summary = generate_summary(&messages, None, DEFAULT_BRIEF_WORDS);
    assert_eq!(signals.decisions, summary.decisions);
    assert_eq!(signals.actions, summary.actions);
    assert_eq!(signals.open_questions, summary.open_questions);
    assert_eq!(signals.constraints, summary.constraints);
}
