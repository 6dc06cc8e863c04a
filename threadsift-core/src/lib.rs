//! # threadsift-core
//!
//! Core library for threadsift - a markdown chat-transcript digest pipeline.
//!
//! This library provides:
//! - A line-oriented transcript parser producing ordered, tagged messages
//! - Signal extraction and rule-based summarization, with optional local
//!   LLM refinement
//! - Heuristic importance scoring and ranking
//! - Timeline extraction with decision supersession tracking
//! - Pluggable behavioral pattern detectors
//! - Entity, topic, and code-block extraction
//!
//! ## Pipeline
//!
//! Raw text flows through parse, score, extract, detect. Every step after
//! parsing is a pure function of the message list; message order is assigned
//! once at parse time and preserved in all user-facing output.
//!
//! ## Example
//!
//! ```rust
//! use threadsift_core::{parser, importance, signals};
//!
//! let mut messages = parser::parse_transcript("User:\nWe will use Postgres", None);
//! importance::score_messages(&mut messages);
//! let summary = signals::generate_summary(&messages, None, signals::DEFAULT_BRIEF_WORDS);
//! assert!(summary.brief.starts_with("Context:"));
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use signals::Signals;
pub use types::*;

// Public modules
pub mod code;
pub mod config;
pub mod entities;
pub mod error;
pub mod format;
pub mod importance;
pub mod llm;
pub mod logging;
pub mod parser;
pub mod patterns;
pub mod signals;
pub mod temporal;
pub mod types;
