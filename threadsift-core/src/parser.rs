//! Markdown transcript parser
//!
//! Splits raw markdown chat exports into ordered, role-tagged [`Message`]
//! records. Parsing is line oriented:
//!
//! - A **speaker marker** line ("User:", "ChatGPT said:", ...) flushes the
//!   current buffer as one message and switches the active role. Content
//!   before the first marker is preamble and is discarded.
//! - A **date marker** line ("January 4, 2026", "Date: 2026-01-04",
//!   "1/4/26") updates the running timestamp applied to subsequently flushed
//!   messages, and is excluded from message content.
//! - Everything else accumulates into the buffer for the active speaker.
//!
//! Tagging runs once per flushed message; tags are independent and a message
//! may carry several or none.

use crate::types::{Message, Role, Tag};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static SPEAKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(#+\s*)?(you said:|chatgpt said:|user:|assistant:|system:|nyra said:|nyra:)\s*$",
    )
    .unwrap()
});

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(#+\s*)?((?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}|Date:\s*[\d/\-]+|\d{1,2}/\d{1,2}/\d{2,4}).*$",
    )
    .unwrap()
});

static FILENAME_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})(\d{2})(\d{4})").unwrap());

static ACTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^- \[ \]|\bTODO\b").unwrap());

static DECISION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(decision|decide|choose|will|set|lock|select|order|decree)\b").unwrap()
});

static CONSTRAINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(must|ensure|require|need to|deadline|mandatory)\b").unwrap()
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Split a markdown transcript into ordered [`Message`] records.
///
/// The optional `filename` may seed an initial date via an embedded MMDDYYYY
/// digit run (e.g., `thread-01042026.md`). Explicit date markers in the text
/// override it from that point on.
///
/// A transcript with no recognized speaker marker yields an empty list.
pub fn parse_transcript(text: &str, filename: Option<&str>) -> Vec<Message> {
    let mut messages: Vec<Message> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut current_role = Role::Unknown;
    let mut order: u32 = 1;
    let mut started = false;

    let mut current_date: Option<NaiveDate> = filename.and_then(date_from_filename);

    for raw_line in text.lines() {
        let line = raw_line.trim_end();
        let stripped = line.trim();

        if let Some(caps) = DATE_PATTERN.captures(stripped) {
            if let Some(date) = parse_date_marker(&caps[2]) {
                current_date = Some(date);
            }
            continue;
        }

        if let Some(caps) = SPEAKER_PATTERN.captures(stripped) {
            if started {
                if let Some(msg) = flush(&mut buffer, current_role, current_date, &mut order) {
                    messages.push(msg);
                }
            } else {
                buffer.clear();
                started = true;
            }
            current_role = role_for_marker(&caps[2]);
            continue;
        }

        if started {
            buffer.push(line);
        }
    }

    if started {
        if let Some(msg) = flush(&mut buffer, current_role, current_date, &mut order) {
            messages.push(msg);
        }
    }

    tracing::debug!(messages = messages.len(), "Parsed transcript");
    messages
}

/// Flush the line buffer into one message, skipping empty turns.
fn flush(
    buffer: &mut Vec<&str>,
    role: Role,
    date: Option<NaiveDate>,
    order: &mut u32,
) -> Option<Message> {
    let content = buffer.join("\n").trim().to_string();
    buffer.clear();
    if content.is_empty() {
        return None;
    }
    let tags = infer_tags(&content);
    let timestamp = date.map(|d| format!("{}T00:00:00", d.format("%Y-%m-%d")));
    let msg = Message {
        order: *order,
        role,
        content,
        tags,
        timestamp,
        importance_score: 5.0,
    };
    *order += 1;
    Some(msg)
}

/// Derive a short title from the first user message, or the first message.
///
/// Returns the first content line, truncated to 60 characters with an
/// ellipsis marker when longer.
pub fn infer_title(messages: &[Message]) -> String {
    let Some(first) = messages.first() else {
        return "Untitled Thread".to_string();
    };
    let candidate = messages
        .iter()
        .find(|m| m.role == Role::User && !m.content.trim().is_empty())
        .unwrap_or(first);
    let text = candidate
        .content
        .trim()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    if text.chars().count() > 60 {
        format!("{}…", text.chars().take(60).collect::<String>())
    } else {
        text
    }
}

fn role_for_marker(label: &str) -> Role {
    match label.to_lowercase().as_str() {
        "you said:" | "user:" => Role::User,
        "chatgpt said:" | "assistant:" | "nyra said:" | "nyra:" => Role::Assistant,
        "system:" => Role::System,
        _ => Role::Unknown,
    }
}

fn infer_tags(content: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    if content.contains("```") {
        tags.push(Tag::Code);
    }
    if content.contains('?') {
        tags.push(Tag::Question);
    }
    if ACTION_PATTERN.is_match(content) {
        tags.push(Tag::Action);
    }
    if DECISION_PATTERN.is_match(content) {
        tags.push(Tag::Decision);
    }
    if CONSTRAINT_PATTERN.is_match(content) {
        tags.push(Tag::Constraint);
    }
    tags
}

fn date_from_filename(filename: &str) -> Option<NaiveDate> {
    let caps = FILENAME_DATE.captures(filename)?;
    let m: u32 = caps[1].parse().ok()?;
    let d: u32 = caps[2].parse().ok()?;
    let y: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Parse the date portion of a matched date-marker line.
///
/// Handles long-form month names ("January 4, 2026"), a "Date:" prefix
/// followed by a dashed or slashed date, and bare slash dates with two- or
/// four-digit years. Returns `None` when the marker is recognized but not
/// numerically parseable; the line is consumed either way.
fn parse_date_marker(marker: &str) -> Option<NaiveDate> {
    let text = marker.trim();

    let lowered = text.to_lowercase();
    if let Some(rest) = lowered.strip_prefix("date:") {
        let rest = rest.trim();
        if let Ok(date) = NaiveDate::parse_from_str(rest, "%Y-%m-%d") {
            return Some(date);
        }
        return parse_slash_date(rest);
    }

    if text.contains('/') {
        return parse_slash_date(text);
    }

    // Month-name form: "January 4, 2026"
    let mut parts = text.split_whitespace();
    let month_word = parts.next()?.to_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_word)? as u32 + 1;
    let day: u32 = parts.next()?.trim_end_matches(',').parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_slash_date(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let m: u32 = parts[0].trim().parse().ok()?;
    let d: u32 = parts[1].trim().parse().ok()?;
    let year_part = parts[2].trim();
    let y: i32 = if year_part.len() == 2 {
        2000 + year_part.parse::<i32>().ok()?
    } else {
        year_part.parse().ok()?
    };
    NaiveDate::from_ymd_opt(y, m, d)
}
