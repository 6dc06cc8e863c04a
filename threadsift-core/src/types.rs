//! Core domain types for threadsift
//!
//! These types form the read-only data surface that downstream collaborators
//! (renderers, exporters, the CLI) consume.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Message** | One parsed conversational turn from a transcript |
//! | **Tag** | A heuristic label attached to a message at parse time |
//! | **Signal** | An extracted line classified as decision/action/question/constraint |
//! | **Summary** | The rule-based (optionally LLM-refined) digest of a thread |
//! | **ThreadDigest** | Metadata + messages + summary, the full export unit |
//!
//! Timestamps cross the boundary as ISO-8601 strings (an optional trailing
//! `Z` is treated as UTC). Anything threadsift emits is RFC 3339.

use crate::code::CodeSummary;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Roles
// ============================================

/// Who authored a message, per the nearest preceding speaker marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            "unknown" => Ok(Role::Unknown),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

// ============================================
// Tags
// ============================================

/// Heuristic label attached to a message at parse time.
///
/// Tags are independent: a message may carry several, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Code,
    Question,
    Action,
    Decision,
    Constraint,
}

impl Tag {
    /// All tags, in detection order.
    pub const ALL: [Tag; 5] = [
        Tag::Code,
        Tag::Question,
        Tag::Action,
        Tag::Decision,
        Tag::Constraint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Code => "code",
            Tag::Question => "question",
            Tag::Action => "action",
            Tag::Decision => "decision",
            Tag::Constraint => "constraint",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(Tag::Code),
            "question" => Ok(Tag::Question),
            "action" => Ok(Tag::Action),
            "decision" => Ok(Tag::Decision),
            "constraint" => Ok(Tag::Constraint),
            _ => Err(format!("unknown tag: {}", s)),
        }
    }
}

// ============================================
// Messages
// ============================================

fn default_importance() -> f64 {
    5.0
}

/// One parsed conversational turn.
///
/// `order` is assigned at parse time in document order, starting at 1, and is
/// never reassigned. `importance_score` stays at the neutral default until
/// [`crate::importance::score_messages`] runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Position in the document, strictly increasing from 1
    pub order: u32,
    /// Role from the nearest preceding speaker marker
    pub role: Role,
    /// Raw text body (markdown retained)
    pub content: String,
    /// Heuristic labels computed once at parse time
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// ISO-8601 timestamp inherited from the most recent date marker, if any
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Importance on a 0-10 scale, neutral until scored
    #[serde(default = "default_importance")]
    pub importance_score: f64,
}

impl Message {
    /// Create a message with the neutral importance score.
    pub fn new(order: u32, role: Role, content: impl Into<String>) -> Self {
        Self {
            order,
            role,
            content: content.into(),
            tags: Vec::new(),
            timestamp: None,
            importance_score: default_importance(),
        }
    }

    /// Check whether this message carries the given tag.
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

// ============================================
// Thread metadata and digest
// ============================================

/// Schema version embedded in exported digests.
pub const SCHEMA_VERSION: u32 = 1;

fn default_created_at() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Metadata describing one digested thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMetadata {
    /// Identifier assigned by the caller (e.g., source file stem)
    pub id: String,
    /// Title inferred from the first user message
    pub title: Option<String>,
    /// Source file the transcript was read from, if any
    pub source_file: Option<String>,
    /// When this digest was created (RFC 3339, UTC)
    #[serde(default = "default_created_at")]
    pub created_at: String,
    /// Schema version for downstream consumers
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

impl ThreadMetadata {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            source_file: None,
            created_at: default_created_at(),
            schema_version: SCHEMA_VERSION,
        }
    }
}

/// Rule-based (optionally LLM-refined) summary of a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Short prose brief
    pub brief: String,
    #[serde(default)]
    pub decisions: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub open_questions: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Present only when the transcript contained code blocks
    #[serde(default)]
    pub code_summary: Option<CodeSummary>,
}

/// Full digest of one thread: metadata + messages + summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadDigest {
    pub thread: ThreadMetadata,
    pub messages: Vec<Message>,
    pub summary: Summary,
}
