//! Fenced code block extraction and summarization.
//!
//! Only messages already tagged `code` are scanned. Each fenced block keeps
//! its language hint, the sentence immediately preceding the fence as
//! context, and the order of the message it came from.

use crate::types::{Message, Tag};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(\w+)?\n(.*?)```").unwrap());

static SENTENCE_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());

static FILE_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:file|create|update|edit|modify)?\s*[`"]?([a-zA-Z0-9_/\-\.]+\.(py|js|ts|json|yaml|yml|toml|md|txt|sh|go|rs|java|cpp|c|h))[`"]?"#,
    )
    .unwrap()
});

/// One fenced code block with its surrounding metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Block body, trimmed
    pub content: String,
    /// Language hint from the fence, or "text"
    pub language: String,
    /// Last sentence of the prose before the fence, if any
    pub context: Option<String>,
    /// Order of the source message
    pub message_order: u32,
}

/// Extract every fenced code block from code-tagged messages, in document
/// order.
pub fn extract_code_blocks(messages: &[Message]) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();

    for msg in messages {
        if !msg.has_tag(Tag::Code) {
            continue;
        }
        for caps in CODE_FENCE.captures_iter(&msg.content) {
            let language = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "text".to_string());
            let content = caps[2].trim().to_string();

            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            let before = msg.content[..start].trim();
            let context = if before.is_empty() {
                None
            } else {
                SENTENCE_SPLIT
                    .split(before)
                    .last()
                    .map(|s| s.to_string())
            };

            blocks.push(CodeBlock {
                content,
                language,
                context,
                message_order: msg.order,
            });
        }
    }

    blocks
}

/// Map each mentioned filename to the latest code block associated with it.
///
/// Association is by filename mention in the block's context sentence; later
/// message order wins.
pub fn latest_code_by_file(messages: &[Message]) -> BTreeMap<String, CodeBlock> {
    let mut file_map: BTreeMap<String, CodeBlock> = BTreeMap::new();

    for block in extract_code_blocks(messages) {
        let Some(context) = &block.context else {
            continue;
        };
        let Some(caps) = FILE_MENTION.captures(context) else {
            continue;
        };
        let filename = caps[1].to_string();
        match file_map.get(&filename) {
            Some(existing) if existing.message_order >= block.message_order => {}
            _ => {
                file_map.insert(filename, block);
            }
        }
    }

    file_map
}

/// Render one block back to markdown, optionally with its context line.
pub fn format_code_block(block: &CodeBlock, include_context: bool) -> String {
    let mut parts = Vec::new();

    if include_context {
        if let Some(context) = &block.context {
            parts.push(format!("*{}*\n", context));
        }
    }

    parts.push(format!("```{}", block.language));
    parts.push(block.content.clone());
    parts.push("```".to_string());

    parts.join("\n")
}

/// Aggregate view of all code in one thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeSummary {
    pub total_blocks: usize,
    pub unique_files: usize,
    /// Block count per language hint
    pub languages: BTreeMap<String, usize>,
    /// Latest block per mentioned filename
    pub files: BTreeMap<String, CodeBlock>,
    pub all_blocks: Vec<CodeBlock>,
}

/// Summarize all code in the conversation.
pub fn code_summary(messages: &[Message]) -> CodeSummary {
    let blocks = extract_code_blocks(messages);
    let files = latest_code_by_file(messages);

    let mut languages: BTreeMap<String, usize> = BTreeMap::new();
    for block in &blocks {
        *languages.entry(block.language.clone()).or_insert(0) += 1;
    }

    CodeSummary {
        total_blocks: blocks.len(),
        unique_files: files.len(),
        languages,
        files,
        all_blocks: blocks,
    }
}
